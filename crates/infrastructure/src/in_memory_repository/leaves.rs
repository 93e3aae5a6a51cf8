use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tokio::sync::RwLock;

use leavedesk_application::{
    LeaveQuery, LeaveRepository, LeaveUsage, Page, ReviewQueueQuery, StatusCount,
};
use leavedesk_core::{AppError, AppResult};
use leavedesk_domain::{
    ApprovalStage, DateRange, LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType, Transition,
    UserId, same_department,
};

use super::paginate;

/// In-memory leave request store.
#[derive(Debug, Default)]
pub struct InMemoryLeaveRepository {
    requests: RwLock<HashMap<LeaveRequestId, LeaveRequest>>,
}

impl InMemoryLeaveRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveRepository for InMemoryLeaveRepository {
    async fn create(&self, request: &LeaveRequest) -> AppResult<()> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id()) {
            return Err(AppError::Conflict(format!(
                "leave request '{}' already exists",
                request.id()
            )));
        }

        requests.insert(request.id(), request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: LeaveRequestId) -> AppResult<Option<LeaveRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn save_transition(&self, request: &LeaveRequest, step: Transition) -> AppResult<()> {
        let mut requests = self.requests.write().await;
        let stored = requests
            .get_mut(&request.id())
            .filter(|stored| stored.status() == step.from && stored.current_stage() == step.stage)
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "leave request '{}' was changed by someone else; reload and try again",
                    request.id()
                ))
            })?;

        *stored = request.clone();
        Ok(())
    }

    async fn list(&self, query: LeaveQuery) -> AppResult<Page<LeaveRequest>> {
        let department = query
            .department
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let mut matching: Vec<LeaveRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|request| {
                query
                    .requester_id
                    .is_none_or(|requester_id| request.requester_id() == requester_id)
                    && query.status.is_none_or(|status| request.status() == status)
                    && query
                        .leave_type
                        .is_none_or(|leave_type| request.leave_type() == leave_type)
                    && department.is_none_or(|value| same_department(request.department(), value))
                    && query
                        .starts_from
                        .is_none_or(|from| request.range().start() >= from)
                    && query
                        .starts_until
                        .is_none_or(|until| request.range().start() <= until)
            })
            .cloned()
            .collect();
        matching.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then(right.id().cmp(&left.id()))
        });

        Ok(paginate(matching, query.limit, query.offset))
    }

    async fn list_review_queue(&self, query: ReviewQueueQuery) -> AppResult<Page<LeaveRequest>> {
        let department = query
            .department
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let mut matching: Vec<LeaveRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|request| {
                let Some(stage) = request.current_stage() else {
                    return false;
                };

                request.status().is_in_review()
                    && query.stages.contains(&stage)
                    && request.requester_id() != query.exclude_requester
                    && (stage != ApprovalStage::DepartmentHead
                        || department
                            .is_none_or(|value| same_department(request.department(), value)))
            })
            .cloned()
            .collect();
        matching.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then(left.id().cmp(&right.id()))
        });

        Ok(paginate(matching, query.limit, query.offset))
    }

    async fn find_active_overlapping(
        &self,
        requester_id: UserId,
        range: DateRange,
    ) -> AppResult<Vec<LeaveRequest>> {
        let mut overlapping: Vec<LeaveRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|request| {
                request.requester_id() == requester_id
                    && request.status().is_active()
                    && request.range().overlaps(&range)
            })
            .cloned()
            .collect();
        overlapping.sort_by_key(|request| request.range().start());

        Ok(overlapping)
    }

    async fn usage_for_requester(
        &self,
        requester_id: UserId,
        year: i32,
    ) -> AppResult<Vec<LeaveUsage>> {
        let mut totals: BTreeMap<(LeaveType, LeaveStatus), u32> = BTreeMap::new();
        for request in self.requests.read().await.values().filter(|request| {
            request.requester_id() == requester_id
                && request.status().is_active()
                && request.range().start().year() == year
        }) {
            *totals
                .entry((request.leave_type(), request.status()))
                .or_default() += u32::from(request.working_days());
        }

        Ok(totals
            .into_iter()
            .map(|((leave_type, status), working_days)| LeaveUsage {
                leave_type,
                status,
                working_days,
            })
            .collect())
    }

    async fn count_by_status(&self, requester_id: Option<UserId>) -> AppResult<Vec<StatusCount>> {
        let mut totals: BTreeMap<LeaveStatus, u64> = BTreeMap::new();
        for request in self
            .requests
            .read()
            .await
            .values()
            .filter(|request| requester_id.is_none_or(|id| request.requester_id() == id))
        {
            *totals.entry(request.status()).or_default() += 1;
        }

        Ok(totals
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn count_on_leave(&self, date: NaiveDate) -> AppResult<u64> {
        let people: HashSet<UserId> = self
            .requests
            .read()
            .await
            .values()
            .filter(|request| {
                request.status() == LeaveStatus::Approved && request.range().contains(date)
            })
            .map(LeaveRequest::requester_id)
            .collect();

        Ok(people.len() as u64)
    }
}
