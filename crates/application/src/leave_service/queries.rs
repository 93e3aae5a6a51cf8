use chrono::Datelike;
use leavedesk_domain::ApprovalStage;

use crate::{LeaveQuery, Page, ReviewQueueQuery};

use super::*;

impl LeaveService {
    /// Returns one request the actor is allowed to see.
    pub async fn get(&self, actor: &UserIdentity, id: LeaveRequestId) -> AppResult<LeaveRequest> {
        let user = self.authorization_service.resolve_actor(actor).await?;
        self.find_visible(&user, id).await
    }

    /// Lists the actor's own requests, newest first.
    pub async fn list_mine(
        &self,
        actor: &UserIdentity,
        status: Option<LeaveStatus>,
        limit: usize,
        offset: usize,
    ) -> AppResult<Page<LeaveRequest>> {
        let user = self.authorization_service.resolve_actor(actor).await?;

        self.leave_repository
            .list(LeaveQuery {
                requester_id: Some(user.id),
                status,
                limit,
                offset,
                ..LeaveQuery::default()
            })
            .await
    }

    /// Lists requests across the organisation.
    pub async fn list_all(
        &self,
        actor: &UserIdentity,
        query: LeaveQuery,
    ) -> AppResult<Page<LeaveRequest>> {
        self.authorization_service
            .require_permission(actor, Permission::LeaveReadAll)
            .await?;

        self.leave_repository.list(query).await
    }

    /// Lists requests waiting for the actor's decision, oldest first.
    pub async fn approval_queue(
        &self,
        actor: &UserIdentity,
        limit: usize,
        offset: usize,
    ) -> AppResult<Page<LeaveRequest>> {
        let user = self.authorization_service.resolve_actor(actor).await?;
        self.queue_for(&user, limit, offset).await
    }

    /// Returns per-type balances of the actor for a year.
    pub async fn balances(&self, actor: &UserIdentity, year: i32) -> AppResult<Vec<LeaveBalance>> {
        let user = self.authorization_service.resolve_actor(actor).await?;
        self.balances_of(&user, year).await
    }

    /// Returns the role-specific dashboard of the actor.
    pub async fn dashboard(&self, actor: &UserIdentity) -> AppResult<DashboardSummary> {
        let user = self.authorization_service.resolve_actor(actor).await?;
        let today = self.clock.today();

        let own_counts = self.leave_repository.count_by_status(Some(user.id)).await?;
        let balances = if user.role.grants(Permission::LeaveSubmit) {
            self.balances_of(&user, today.year()).await?
        } else {
            Vec::new()
        };
        let queue_size = self.queue_for(&user, 1, 0).await?.total;

        let organisation = if user.role.grants(Permission::LeaveReadAll) {
            Some(OrganisationSummary {
                counts: self.leave_repository.count_by_status(None).await?,
                on_leave_today: self.leave_repository.count_on_leave(today).await?,
            })
        } else {
            None
        };

        Ok(DashboardSummary {
            today,
            own_counts,
            balances,
            queue_size,
            organisation,
        })
    }

    async fn queue_for(
        &self,
        user: &UserRecord,
        limit: usize,
        offset: usize,
    ) -> AppResult<Page<LeaveRequest>> {
        let stages: Vec<ApprovalStage> = ApprovalStage::all()
            .iter()
            .copied()
            .filter(|stage| user.role.grants(stage.review_permission()))
            .collect();
        if stages.is_empty() {
            return Ok(Page::empty(limit, offset));
        }

        let department = stages
            .contains(&ApprovalStage::DepartmentHead)
            .then(|| user.department.clone());

        self.leave_repository
            .list_review_queue(ReviewQueueQuery {
                stages,
                department,
                exclude_requester: user.id,
                limit,
                offset,
            })
            .await
    }

    async fn balances_of(&self, user: &UserRecord, year: i32) -> AppResult<Vec<LeaveBalance>> {
        let prior_year = previous_year(year)?;
        let policies = self.policy_repository.list().await?;
        let current = self
            .leave_repository
            .usage_for_requester(user.id, year)
            .await?;
        let previous = self
            .leave_repository
            .usage_for_requester(user.id, prior_year)
            .await?;

        Ok(policies
            .iter()
            .map(|policy| balance_for(policy, &current, &previous))
            .collect())
    }
}
