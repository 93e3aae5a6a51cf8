//! Role-gated approval pipeline for leave requests.
//!
//! A request moves through at most three stages, department head, HR admin
//! and final (HR head or CEO). [`transition`] is the single lookup that
//! decides whether an actor may apply an action to a request and where the
//! request goes next.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use leavedesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::leave::{LeaveRequest, LeaveStatus};
use crate::security::{Permission, Role};
use crate::user::UserId;

/// Role-gated checkpoint a request waits at while in review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStage {
    /// Head of the requester's department.
    DepartmentHead,
    /// Any HR administrator.
    HrAdmin,
    /// HR head or CEO.
    Final,
}

impl ApprovalStage {
    /// Returns a stable storage value for this stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepartmentHead => "department_head",
            Self::HrAdmin => "hr_admin",
            Self::Final => "final",
        }
    }

    /// Returns all stages in pipeline order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::DepartmentHead, Self::HrAdmin, Self::Final]
    }

    /// Returns the stage a request moves to when forwarded.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::DepartmentHead => Some(Self::HrAdmin),
            Self::HrAdmin => Some(Self::Final),
            Self::Final => None,
        }
    }

    /// Returns the permission a reviewer needs to hold this stage.
    #[must_use]
    pub fn review_permission(&self) -> Permission {
        match self {
            Self::DepartmentHead => Permission::LeaveReviewDepartment,
            Self::HrAdmin => Permission::LeaveReviewHr,
            Self::Final => Permission::LeaveReviewFinal,
        }
    }

    /// Returns the first stage strictly above the requester's role.
    #[must_use]
    pub fn initial_for(requester_role: Role) -> Self {
        match requester_role {
            Role::Employee => Self::DepartmentHead,
            Role::DepartmentHead => Self::HrAdmin,
            Role::HrAdmin | Role::HrHead | Role::Ceo | Role::SuperAdmin => Self::Final,
        }
    }

    /// Returns whether the actor holds this stage for a requester department.
    ///
    /// Department heads only hold the first stage for their own department.
    #[must_use]
    pub fn is_held_by(&self, actor: &ActingUser, requester_department: &str) -> bool {
        actor.role.grants(self.review_permission())
            && (*self != Self::DepartmentHead
                || same_department(actor.department.as_str(), requester_department))
    }
}

impl FromStr for ApprovalStage {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "department_head" => Ok(Self::DepartmentHead),
            "hr_admin" => Ok(Self::HrAdmin),
            "final" => Ok(Self::Final),
            _ => Err(AppError::Validation(format!(
                "unknown approval stage '{value}'"
            ))),
        }
    }
}

/// Compares department names the way the store's `lower()` does, trimmed and
/// case-insensitive over the full Unicode range.
#[must_use]
pub fn same_department(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Action recorded against a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    /// Initial submission by the requester.
    Submit,
    /// Requester edited a returned request and sent it again.
    Resubmit,
    /// Reviewer passed the request to the next stage.
    Forward,
    /// Final-stage reviewer granted the leave.
    Approve,
    /// Reviewer declined the leave.
    Reject,
    /// Reviewer sent the request back to the requester for changes.
    Return,
    /// Requester (or HR for approved leave) withdrew the request.
    Cancel,
}

impl ApprovalAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Resubmit => "resubmit",
            Self::Forward => "forward",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Return => "return",
            Self::Cancel => "cancel",
        }
    }

    /// Returns whether the action is a reviewer decision.
    #[must_use]
    pub fn is_review(&self) -> bool {
        matches!(
            self,
            Self::Forward | Self::Approve | Self::Reject | Self::Return
        )
    }

    /// Returns whether the action must carry an explanatory comment.
    #[must_use]
    pub fn requires_comment(&self) -> bool {
        matches!(self, Self::Reject | Self::Return)
    }
}

impl FromStr for ApprovalAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "submit" => Ok(Self::Submit),
            "resubmit" => Ok(Self::Resubmit),
            "forward" => Ok(Self::Forward),
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "return" => Ok(Self::Return),
            "cancel" => Ok(Self::Cancel),
            _ => Err(AppError::Validation(format!(
                "unknown approval action '{value}'"
            ))),
        }
    }
}

/// The user applying an action, resolved from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    /// Acting user id.
    pub user_id: UserId,
    /// Acting user's role.
    pub role: Role,
    /// Acting user's department.
    pub department: String,
}

/// One entry of a request's approval history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// User that performed the action.
    pub actor_id: UserId,
    /// Actor role at the time of the action.
    pub actor_role: Role,
    /// Action performed.
    pub action: ApprovalAction,
    /// Status before the action.
    pub from_status: Option<LeaveStatus>,
    /// Status after the action.
    pub to_status: LeaveStatus,
    /// Stage the request was waiting at when the action happened.
    pub stage: Option<ApprovalStage>,
    /// Optional reviewer or requester comment.
    pub comment: Option<String>,
    /// Action timestamp.
    pub acted_at: DateTime<Utc>,
}

/// Outcome of a permitted state machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status the transition was computed from.
    pub from: LeaveStatus,
    /// Status after the transition.
    pub to: LeaveStatus,
    /// Stage the request was waiting at.
    pub stage: Option<ApprovalStage>,
    /// Stage the request waits at afterwards.
    pub next_stage: Option<ApprovalStage>,
}

/// Decides whether `actor` may apply `action` to `request` on `today`.
pub fn transition(
    request: &LeaveRequest,
    actor: &ActingUser,
    action: ApprovalAction,
    today: NaiveDate,
) -> AppResult<Transition> {
    let from = request.status();
    let stage = request.current_stage();
    let is_requester = request.requester_id() == actor.user_id;

    match action {
        ApprovalAction::Submit | ApprovalAction::Resubmit => Err(AppError::Validation(format!(
            "'{}' is not a review action",
            action.as_str()
        ))),
        ApprovalAction::Cancel => {
            let to = LeaveStatus::Cancelled;
            match from {
                LeaveStatus::Submitted | LeaveStatus::Pending | LeaveStatus::Returned => {
                    if !is_requester {
                        return Err(AppError::Forbidden(
                            "only the requester can cancel a request that is not yet decided"
                                .to_owned(),
                        ));
                    }
                    Ok(Transition {
                        from,
                        to,
                        stage,
                        next_stage: None,
                    })
                }
                LeaveStatus::Approved => {
                    if !is_requester && actor.role != Role::HrAdmin {
                        return Err(AppError::Forbidden(
                            "only the requester or HR can cancel approved leave".to_owned(),
                        ));
                    }
                    if today >= request.range().start() {
                        return Err(AppError::Conflict(
                            "approved leave that has already started cannot be cancelled"
                                .to_owned(),
                        ));
                    }
                    Ok(Transition {
                        from,
                        to,
                        stage,
                        next_stage: None,
                    })
                }
                LeaveStatus::Rejected | LeaveStatus::Cancelled => Err(invalid_from(action, from)),
            }
        }
        ApprovalAction::Forward
        | ApprovalAction::Approve
        | ApprovalAction::Reject
        | ApprovalAction::Return => {
            if !from.is_in_review() {
                return Err(invalid_from(action, from));
            }
            let Some(current_stage) = stage else {
                return Err(AppError::Conflict(
                    "request has no active approval stage".to_owned(),
                ));
            };
            if is_requester {
                return Err(AppError::Forbidden(
                    "requesters cannot review their own leave request".to_owned(),
                ));
            }
            if !current_stage.is_held_by(actor, request.department()) {
                return Err(AppError::Forbidden(format!(
                    "role '{}' does not hold the '{}' approval stage for this request",
                    actor.role.as_str(),
                    current_stage.as_str()
                )));
            }

            let (to, next_stage) = match action {
                ApprovalAction::Forward => {
                    let Some(next_stage) = current_stage.next() else {
                        return Err(AppError::Conflict(
                            "request is at the final stage and must be approved, rejected or returned"
                                .to_owned(),
                        ));
                    };
                    (LeaveStatus::Pending, Some(next_stage))
                }
                ApprovalAction::Approve => {
                    if current_stage != ApprovalStage::Final {
                        return Err(AppError::Conflict(
                            "request must be forwarded to the final stage before approval"
                                .to_owned(),
                        ));
                    }
                    (LeaveStatus::Approved, None)
                }
                ApprovalAction::Reject => (LeaveStatus::Rejected, None),
                _ => (LeaveStatus::Returned, None),
            };

            Ok(Transition {
                from,
                to,
                stage,
                next_stage,
            })
        }
    }
}

fn invalid_from(action: ApprovalAction, from: LeaveStatus) -> AppError {
    AppError::Conflict(format!(
        "cannot {} a request in status '{}'",
        action.as_str(),
        from.as_str()
    ))
}
