//! Leave requests: submission, review pipeline, balances and dashboards.

use std::sync::Arc;

use chrono::NaiveDate;
use leavedesk_core::{AppError, AppResult, UserIdentity};
use leavedesk_domain::{
    ApprovalAction, AuditAction, LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType, Permission,
    PolicyConfig, Role, same_department,
};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, Clock, HolidayRepository, LeaveRepository,
    LeaveUsage, PolicyRepository, StatusCount, UserRecord, UserRepository,
};

mod queries;
mod review;
mod submission;

/// Most ids accepted by one bulk action.
pub const BULK_ACTION_MAX_IDS: usize = 100;

/// Input for submitting or resubmitting a leave request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitLeaveInput {
    /// Requested leave type.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Requester's reason.
    pub reason: String,
}

/// Input for applying one review action to many requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionInput {
    /// Request ids, processed in order.
    pub ids: Vec<LeaveRequestId>,
    /// Review action applied to each request.
    pub action: ApprovalAction,
    /// Comment attached to every action.
    pub comment: Option<String>,
}

/// One request a bulk action could not be applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    /// Request id.
    pub id: LeaveRequestId,
    /// Error message for this request.
    pub message: String,
}

/// Per-item results of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkActionOutcome {
    /// Ids the action was applied to.
    pub succeeded: Vec<LeaveRequestId>,
    /// Ids that failed and why.
    pub failed: Vec<BulkFailure>,
}

/// Balance of one leave type for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveBalance {
    /// Leave type.
    pub leave_type: LeaveType,
    /// Annual entitlement.
    pub entitled: u32,
    /// Days carried from the previous year.
    pub carried: u32,
    /// Approved working days.
    pub used: u32,
    /// Working days still in review.
    pub pending: u32,
    /// `entitled + carried - used - pending`; may go negative after a policy change.
    pub remaining: i64,
    /// Whether submissions are checked against `remaining`.
    pub enforced: bool,
}

/// Organisation-wide figures shown to HR and leadership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationSummary {
    /// Requests per status across all users.
    pub counts: Vec<StatusCount>,
    /// People on approved leave today.
    pub on_leave_today: u64,
}

/// Role-specific dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Day the figures were computed for.
    pub today: NaiveDate,
    /// Actor's own requests per status.
    pub own_counts: Vec<StatusCount>,
    /// Actor's balances for the current year.
    pub balances: Vec<LeaveBalance>,
    /// Requests waiting for the actor's decision.
    pub queue_size: u64,
    /// Present for users who can read all requests.
    pub organisation: Option<OrganisationSummary>,
}

/// Application service for leave requests.
#[derive(Clone)]
pub struct LeaveService {
    authorization_service: AuthorizationService,
    leave_repository: Arc<dyn LeaveRepository>,
    policy_repository: Arc<dyn PolicyRepository>,
    holiday_repository: Arc<dyn HolidayRepository>,
    user_repository: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl LeaveService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        leave_repository: Arc<dyn LeaveRepository>,
        policy_repository: Arc<dyn PolicyRepository>,
        holiday_repository: Arc<dyn HolidayRepository>,
        user_repository: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authorization_service,
            leave_repository,
            policy_repository,
            holiday_repository,
            user_repository,
            audit_repository,
            clock,
        }
    }

    async fn find_visible(
        &self,
        user: &UserRecord,
        id: LeaveRequestId,
    ) -> AppResult<LeaveRequest> {
        match self.leave_repository.find_by_id(id).await? {
            Some(request) if can_view(user, &request) => Ok(request),
            _ => Err(AppError::NotFound(format!("leave request '{id}' not found"))),
        }
    }

    async fn balance_of(
        &self,
        user: &UserRecord,
        policy: &PolicyConfig,
        year: i32,
    ) -> AppResult<LeaveBalance> {
        let prior_year = previous_year(year)?;
        let current = self
            .leave_repository
            .usage_for_requester(user.id, year)
            .await?;
        let previous = self
            .leave_repository
            .usage_for_requester(user.id, prior_year)
            .await?;

        Ok(balance_for(policy, &current, &previous))
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        request: &LeaveRequest,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action,
                resource_type: "leave_request".to_owned(),
                resource_id: request.id().to_string(),
                detail: Some(detail),
            })
            .await
    }
}

/// Year whose unused allowance carries into `year`, rejecting calendar years chrono cannot represent.
fn previous_year(year: i32) -> AppResult<i32> {
    year.checked_sub(1)
        .filter(|previous| {
            NaiveDate::from_ymd_opt(year, 1, 1).is_some()
                && NaiveDate::from_ymd_opt(*previous, 1, 1).is_some()
        })
        .ok_or_else(|| AppError::Validation(format!("year {year} is out of range")))
}

fn can_view(user: &UserRecord, request: &LeaveRequest) -> bool {
    request.requester_id() == user.id
        || user.role.grants(Permission::LeaveReadAll)
        || request.was_reviewed_by(user.id)
        || request
            .current_stage()
            .is_some_and(|stage| stage.is_held_by(&user.acting_user(), request.department()))
        || (user.role == Role::DepartmentHead
            && same_department(&user.department, request.department()))
}

fn balance_for(
    policy: &PolicyConfig,
    current: &[LeaveUsage],
    previous: &[LeaveUsage],
) -> LeaveBalance {
    let sum = |usage: &[LeaveUsage], statuses: &[LeaveStatus]| -> u32 {
        usage
            .iter()
            .filter(|entry| {
                entry.leave_type == policy.leave_type() && statuses.contains(&entry.status)
            })
            .map(|entry| entry.working_days)
            .sum()
    };

    let entitled = u32::from(policy.max_days());
    let carried = policy.carried_days(sum(previous, &[LeaveStatus::Approved]));
    let used = sum(current, &[LeaveStatus::Approved]);
    let pending = sum(current, &[LeaveStatus::Submitted, LeaveStatus::Pending]);

    LeaveBalance {
        leave_type: policy.leave_type(),
        entitled,
        carried,
        used,
        pending,
        remaining: i64::from(entitled) + i64::from(carried) - i64::from(used) - i64::from(pending),
        enforced: policy.leave_type().is_balance_limited(),
    }
}

fn audit_action_for(action: ApprovalAction) -> AuditAction {
    match action {
        ApprovalAction::Submit => AuditAction::LeaveSubmitted,
        ApprovalAction::Resubmit => AuditAction::LeaveResubmitted,
        ApprovalAction::Forward => AuditAction::LeaveForwarded,
        ApprovalAction::Approve => AuditAction::LeaveApproved,
        ApprovalAction::Reject => AuditAction::LeaveRejected,
        ApprovalAction::Return => AuditAction::LeaveReturned,
        ApprovalAction::Cancel => AuditAction::LeaveCancelled,
    }
}
