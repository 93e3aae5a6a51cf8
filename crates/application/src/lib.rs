//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_log_service;
mod audit_ports;
mod authorization_service;
mod holiday_service;
mod leave_ports;
mod leave_service;
mod policy_service;
mod rate_limit_service;
mod user_ports;
mod user_service;

#[cfg(test)]
mod test_fakes;

pub use audit_log_service::AuditLogService;
pub use audit_ports::{
    AUDIT_LOG_MAX_LIMIT, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository,
};
pub use authorization_service::AuthorizationService;
pub use holiday_service::{HolidayRepository, HolidayService};
pub use leave_ports::{
    Clock, LeaveQuery, LeaveRepository, LeaveUsage, ReviewQueueQuery, StatusCount, SystemClock,
};
pub use leave_service::{
    BULK_ACTION_MAX_IDS, BulkActionInput, BulkActionOutcome, BulkFailure, DashboardSummary,
    LeaveBalance, LeaveService, OrganisationSummary, SubmitLeaveInput,
};
pub use policy_service::{PolicyRepository, PolicyService};
pub use rate_limit_service::{RateLimitRepository, RateLimitRule, RateLimitService, RateWindow};
pub use user_ports::{
    NewUserRecord, Page, PasswordHasher, USER_NAME_MAX_CHARS, UserQuery, UserRecord,
    UserRepository,
};
pub use user_service::{
    AuthOutcome, BootstrapInput, CreateUserInput, UpdateUserInput, UserService,
};
