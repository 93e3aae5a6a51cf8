//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod approval;
mod calendar;
mod leave;
mod policy;
mod security;
mod user;

pub use approval::{
    ActingUser, ApprovalAction, ApprovalRecord, ApprovalStage, Transition, same_department,
    transition,
};
pub use calendar::{DateRange, Holiday, MAX_RANGE_DAYS, WorkingCalendar};
pub use leave::{
    LeaveDraft, LeaveRequest, LeaveRequestId, LeaveRequestParts, LeaveStatus, LeaveType,
    REASON_MAX_CHARS,
};
pub use policy::{POLICY_MAX_DAYS, PolicyConfig, PolicyConfigInput};
pub use security::{AuditAction, Permission, Role};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, validate_password,
};
