use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use leavedesk_core::AppResult;
use leavedesk_domain::{
    ApprovalStage, DateRange, LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType, Transition,
    UserId,
};

use crate::Page;

/// Source of the current time for date-sensitive rules.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Filters for listing leave requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaveQuery {
    /// Only requests of this requester.
    pub requester_id: Option<UserId>,
    /// Only requests in this status.
    pub status: Option<LeaveStatus>,
    /// Only requests of this type.
    pub leave_type: Option<LeaveType>,
    /// Only requests of this department (case-insensitive).
    pub department: Option<String>,
    /// Only requests starting on or after this date.
    pub starts_from: Option<NaiveDate>,
    /// Only requests starting on or before this date.
    pub starts_until: Option<NaiveDate>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Rows skipped.
    pub offset: usize,
}

/// Filters for a reviewer's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQueueQuery {
    /// Stages the reviewer holds.
    pub stages: Vec<ApprovalStage>,
    /// Restricts `department_head` stage requests to one department.
    pub department: Option<String>,
    /// Reviewer's own requests never show up in their queue.
    pub exclude_requester: UserId,
    /// Maximum rows returned.
    pub limit: usize,
    /// Rows skipped.
    pub offset: usize,
}

/// Working days booked per type and status within one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveUsage {
    /// Leave type.
    pub leave_type: LeaveType,
    /// Request status.
    pub status: LeaveStatus,
    /// Sum of working days.
    pub working_days: u32,
}

/// Number of requests in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    /// Status.
    pub status: LeaveStatus,
    /// Request count.
    pub count: u64,
}

/// Repository port for leave request persistence.
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    /// Inserts a newly submitted request.
    async fn create(&self, request: &LeaveRequest) -> AppResult<()>;

    /// Finds a request by id.
    async fn find_by_id(&self, id: LeaveRequestId) -> AppResult<Option<LeaveRequest>>;

    /// Persists a transitioned request.
    ///
    /// The write only happens while the stored status and stage still equal
    /// `step.from` and `step.stage`; otherwise it fails with a conflict.
    async fn save_transition(&self, request: &LeaveRequest, step: Transition) -> AppResult<()>;

    /// Lists requests matching the query, newest first.
    async fn list(&self, query: LeaveQuery) -> AppResult<Page<LeaveRequest>>;

    /// Lists in-review requests waiting at the given stages, oldest first.
    async fn list_review_queue(&self, query: ReviewQueueQuery) -> AppResult<Page<LeaveRequest>>;

    /// Lists the requester's active requests overlapping a date range.
    async fn find_active_overlapping(
        &self,
        requester_id: UserId,
        range: DateRange,
    ) -> AppResult<Vec<LeaveRequest>>;

    /// Sums active working days per type and status for requests starting in `year`.
    async fn usage_for_requester(
        &self,
        requester_id: UserId,
        year: i32,
    ) -> AppResult<Vec<LeaveUsage>>;

    /// Counts requests per status, optionally for one requester.
    async fn count_by_status(&self, requester_id: Option<UserId>) -> AppResult<Vec<StatusCount>>;

    /// Counts distinct people with approved leave covering `date`.
    async fn count_on_leave(&self, date: NaiveDate) -> AppResult<u64>;
}
