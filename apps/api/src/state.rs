use leavedesk_application::{
    AuditLogService, HolidayService, LeaveService, PolicyService, RateLimitService, UserService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub leave_service: LeaveService,
    pub policy_service: PolicyService,
    pub holiday_service: HolidayService,
    pub audit_log_service: AuditLogService,
    pub rate_limit_service: RateLimitService,
    /// Absent when the API runs on in-memory adapters.
    pub postgres_pool: Option<PgPool>,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
