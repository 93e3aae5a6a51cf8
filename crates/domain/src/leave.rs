//! Leave request entity.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use leavedesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::approval::{
    ActingUser, ApprovalAction, ApprovalRecord, ApprovalStage, Transition, transition,
};
use crate::calendar::DateRange;
use crate::user::UserId;

/// Maximum length of a leave reason or review comment.
pub const REASON_MAX_CHARS: usize = 1_000;

/// Unique identifier for a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaveRequestId(Uuid);

impl LeaveRequestId {
    /// Creates a new random leave request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LeaveRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LeaveRequestId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for LeaveRequestId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid leave request id '{value}': {error}"))
        })
    }
}

/// Kind of leave being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid annual vacation.
    Annual,
    /// Short casual leave.
    Casual,
    /// Sick leave.
    Sick,
    /// Maternity leave.
    Maternity,
    /// Paternity leave.
    Paternity,
    /// Unpaid leave; reported but never balance-limited.
    Unpaid,
}

impl LeaveType {
    /// Returns a stable storage value for this leave type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Casual => "casual",
            Self::Sick => "sick",
            Self::Maternity => "maternity",
            Self::Paternity => "paternity",
            Self::Unpaid => "unpaid",
        }
    }

    /// Returns all known leave types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[LeaveType] = &[
            LeaveType::Annual,
            LeaveType::Casual,
            LeaveType::Sick,
            LeaveType::Maternity,
            LeaveType::Paternity,
            LeaveType::Unpaid,
        ];

        ALL
    }

    /// Returns whether submissions are checked against the remaining balance.
    #[must_use]
    pub fn is_balance_limited(&self) -> bool {
        !matches!(self, Self::Unpaid)
    }
}

impl FromStr for LeaveType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "annual" => Ok(Self::Annual),
            "casual" => Ok(Self::Casual),
            "sick" => Ok(Self::Sick),
            "maternity" => Ok(Self::Maternity),
            "paternity" => Ok(Self::Paternity),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(AppError::Validation(format!("unknown leave type '{value}'"))),
        }
    }
}

/// Lifecycle status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Waiting at its first stage.
    Submitted,
    /// Forwarded at least once, waiting at a later stage.
    Pending,
    /// Granted.
    Approved,
    /// Declined.
    Rejected,
    /// Sent back to the requester for changes.
    Returned,
    /// Withdrawn.
    Cancelled,
}

impl LeaveStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all known statuses.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[LeaveStatus] = &[
            LeaveStatus::Submitted,
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Returned,
            LeaveStatus::Cancelled,
        ];

        ALL
    }

    /// Returns whether a reviewer can act on the request.
    #[must_use]
    pub fn is_in_review(&self) -> bool {
        matches!(self, Self::Submitted | Self::Pending)
    }

    /// Returns whether the request consumes balance and blocks overlapping requests.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitted | Self::Pending | Self::Approved)
    }
}

impl FromStr for LeaveStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "submitted" => Ok(Self::Submitted),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "returned" => Ok(Self::Returned),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown leave status '{value}'"
            ))),
        }
    }
}

/// Validated content of a submission or resubmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveDraft {
    /// Requested leave type.
    pub leave_type: LeaveType,
    /// Requested dates.
    pub range: DateRange,
    /// Working days inside `range`.
    pub working_days: u16,
    /// Requester's reason.
    pub reason: String,
}

/// Persisted state used to rehydrate a [`LeaveRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequestParts {
    /// Request id.
    pub id: LeaveRequestId,
    /// Requester id.
    pub requester_id: UserId,
    /// Requester display name at submission.
    pub requester_name: String,
    /// Requester department at submission.
    pub department: String,
    /// Leave type.
    pub leave_type: LeaveType,
    /// Requested dates.
    pub range: DateRange,
    /// Working days inside the range.
    pub working_days: u16,
    /// Requester's reason.
    pub reason: String,
    /// Current status.
    pub status: LeaveStatus,
    /// Stage the request waits at, while in review.
    pub current_stage: Option<ApprovalStage>,
    /// Approval history, oldest first.
    pub approvals: Vec<ApprovalRecord>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Employee leave request and its approval history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    id: LeaveRequestId,
    requester_id: UserId,
    requester_name: String,
    department: String,
    leave_type: LeaveType,
    range: DateRange,
    working_days: u16,
    reason: NonEmptyString,
    status: LeaveStatus,
    current_stage: Option<ApprovalStage>,
    approvals: Vec<ApprovalRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Creates a freshly submitted request waiting at `initial_stage`.
    pub fn submit(
        requester: &ActingUser,
        requester_name: impl Into<String>,
        draft: LeaveDraft,
        initial_stage: ApprovalStage,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let reason = validate_draft(&draft)?;

        Ok(Self {
            id: LeaveRequestId::new(),
            requester_id: requester.user_id,
            requester_name: requester_name.into(),
            department: requester.department.clone(),
            leave_type: draft.leave_type,
            range: draft.range,
            working_days: draft.working_days,
            reason,
            status: LeaveStatus::Submitted,
            current_stage: Some(initial_stage),
            approvals: vec![ApprovalRecord {
                actor_id: requester.user_id,
                actor_role: requester.role,
                action: ApprovalAction::Submit,
                from_status: None,
                to_status: LeaveStatus::Submitted,
                stage: Some(initial_stage),
                comment: None,
                acted_at: now,
            }],
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrates a request from storage.
    pub fn restore(parts: LeaveRequestParts) -> AppResult<Self> {
        if parts.status.is_in_review() != parts.current_stage.is_some() {
            return Err(AppError::Internal(format!(
                "leave request '{}' has inconsistent status '{}' and stage",
                parts.id,
                parts.status.as_str()
            )));
        }

        Ok(Self {
            id: parts.id,
            requester_id: parts.requester_id,
            requester_name: parts.requester_name,
            department: parts.department,
            leave_type: parts.leave_type,
            range: parts.range,
            working_days: parts.working_days,
            reason: NonEmptyString::new(parts.reason)?,
            status: parts.status,
            current_stage: parts.current_stage,
            approvals: parts.approvals,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    /// Applies a review or cancel action and records it in the history.
    pub fn apply(
        &mut self,
        actor: &ActingUser,
        action: ApprovalAction,
        comment: Option<String>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        let comment = normalize_comment(comment)?;
        if action.requires_comment() && comment.is_none() {
            return Err(AppError::Validation(format!(
                "a comment is required to {} a request",
                action.as_str()
            )));
        }

        let step = transition(self, actor, action, today)?;

        self.status = step.to;
        self.current_stage = step.next_stage;
        self.updated_at = now;
        self.approvals.push(ApprovalRecord {
            actor_id: actor.user_id,
            actor_role: actor.role,
            action,
            from_status: Some(step.from),
            to_status: step.to,
            stage: step.stage,
            comment,
            acted_at: now,
        });

        Ok(step)
    }

    /// Replaces the content of a returned request and puts it back in review.
    pub fn resubmit(
        &mut self,
        requester: &ActingUser,
        draft: LeaveDraft,
        initial_stage: ApprovalStage,
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        if requester.user_id != self.requester_id {
            return Err(AppError::Forbidden(
                "only the requester can resubmit a leave request".to_owned(),
            ));
        }
        if self.status != LeaveStatus::Returned {
            return Err(AppError::Conflict(format!(
                "cannot resubmit a request in status '{}'",
                self.status.as_str()
            )));
        }

        let reason = validate_draft(&draft)?;
        let from = self.status;

        self.leave_type = draft.leave_type;
        self.range = draft.range;
        self.working_days = draft.working_days;
        self.reason = reason;
        self.status = LeaveStatus::Submitted;
        self.current_stage = Some(initial_stage);
        self.updated_at = now;
        self.approvals.push(ApprovalRecord {
            actor_id: requester.user_id,
            actor_role: requester.role,
            action: ApprovalAction::Resubmit,
            from_status: Some(from),
            to_status: LeaveStatus::Submitted,
            stage: Some(initial_stage),
            comment: None,
            acted_at: now,
        });

        Ok(Transition {
            from,
            to: LeaveStatus::Submitted,
            stage: None,
            next_stage: Some(initial_stage),
        })
    }

    /// Returns the request id.
    #[must_use]
    pub fn id(&self) -> LeaveRequestId {
        self.id
    }

    /// Returns the requester id.
    #[must_use]
    pub fn requester_id(&self) -> UserId {
        self.requester_id
    }

    /// Returns the requester display name captured at submission.
    #[must_use]
    pub fn requester_name(&self) -> &str {
        self.requester_name.as_str()
    }

    /// Returns the requester department captured at submission.
    #[must_use]
    pub fn department(&self) -> &str {
        self.department.as_str()
    }

    /// Returns the leave type.
    #[must_use]
    pub fn leave_type(&self) -> LeaveType {
        self.leave_type
    }

    /// Returns the requested dates.
    #[must_use]
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Returns the working days covered.
    #[must_use]
    pub fn working_days(&self) -> u16 {
        self.working_days
    }

    /// Returns the requester's reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> LeaveStatus {
        self.status
    }

    /// Returns the stage the request waits at, if in review.
    #[must_use]
    pub fn current_stage(&self) -> Option<ApprovalStage> {
        self.current_stage
    }

    /// Returns the approval history, oldest first.
    #[must_use]
    pub fn approvals(&self) -> &[ApprovalRecord] {
        &self.approvals
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last change timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the user acted on this request at some point.
    #[must_use]
    pub fn was_reviewed_by(&self, user_id: UserId) -> bool {
        self.approvals
            .iter()
            .any(|record| record.actor_id == user_id && record.action.is_review())
    }
}

fn validate_draft(draft: &LeaveDraft) -> AppResult<NonEmptyString> {
    if draft.working_days == 0 {
        return Err(AppError::Validation(
            "the requested dates do not contain any working day".to_owned(),
        ));
    }

    NonEmptyString::with_max_chars("reason", draft.reason.as_str(), REASON_MAX_CHARS)
}

fn normalize_comment(comment: Option<String>) -> AppResult<Option<String>> {
    let Some(comment) = comment else {
        return Ok(None);
    };
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > REASON_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "comment must not exceed {REASON_MAX_CHARS} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}
