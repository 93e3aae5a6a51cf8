use std::sync::Arc;

use leavedesk_application::{
    AuditLogRepository, AuditLogService, AuditRepository, AuthorizationService, Clock,
    HolidayRepository, HolidayService, LeaveRepository, LeaveService, PasswordHasher,
    PolicyRepository, PolicyService, RateLimitRepository, RateLimitService, SystemClock,
    UserRepository, UserService,
};
use leavedesk_infrastructure::{
    Argon2PasswordHasher, PostgresAuditRepository, PostgresHolidayRepository,
    PostgresLeaveRepository, PostgresPolicyRepository,
    PostgresRateLimitRepository, PostgresUserRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

struct Repositories {
    users: Arc<dyn UserRepository>,
    leaves: Arc<dyn LeaveRepository>,
    policies: Arc<dyn PolicyRepository>,
    holidays: Arc<dyn HolidayRepository>,
    audit: Arc<dyn AuditRepository>,
    audit_log: Arc<dyn AuditLogRepository>,
    rate_limits: Arc<dyn RateLimitRepository>,
}

pub fn build_app_state(config: &ApiConfig, pool: PgPool) -> AppState {
    let audit = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let repositories = Repositories {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        leaves: Arc::new(PostgresLeaveRepository::new(pool.clone())),
        policies: Arc::new(PostgresPolicyRepository::new(pool.clone())),
        holidays: Arc::new(PostgresHolidayRepository::new(pool.clone())),
        audit: audit.clone(),
        audit_log: audit,
        rate_limits: Arc::new(PostgresRateLimitRepository::new(pool.clone())),
    };

    assemble(
        repositories,
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(SystemClock),
        Some(pool),
        config.frontend_url.clone(),
        config.bootstrap_token.clone(),
    )
}

/// Wires every service to in-memory adapters.
#[cfg(test)]
pub fn build_in_memory_app_state(
    frontend_url: &str,
    bootstrap_token: &str,
    clock: Arc<dyn Clock>,
) -> Result<AppState, leavedesk_core::AppError> {
    use leavedesk_infrastructure::{
        InMemoryAuditRepository, InMemoryHolidayRepository, InMemoryLeaveRepository,
        InMemoryPolicyRepository, InMemoryRateLimitRepository, InMemoryUserRepository,
    };

    let audit = Arc::new(InMemoryAuditRepository::new());
    let repositories = Repositories {
        users: Arc::new(InMemoryUserRepository::new()),
        leaves: Arc::new(InMemoryLeaveRepository::new()),
        policies: Arc::new(InMemoryPolicyRepository::with_defaults()?),
        holidays: Arc::new(InMemoryHolidayRepository::new()),
        audit: audit.clone(),
        audit_log: audit,
        rate_limits: Arc::new(InMemoryRateLimitRepository::new()),
    };

    Ok(assemble(
        repositories,
        Arc::new(Argon2PasswordHasher::new()),
        clock,
        None,
        frontend_url.to_owned(),
        bootstrap_token.to_owned(),
    ))
}

fn assemble(
    repositories: Repositories,
    password_hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    postgres_pool: Option<PgPool>,
    frontend_url: String,
    bootstrap_token: String,
) -> AppState {
    let authorization_service = AuthorizationService::new(repositories.users.clone());

    AppState {
        user_service: UserService::new(
            authorization_service.clone(),
            repositories.users.clone(),
            password_hasher,
            repositories.audit.clone(),
        ),
        leave_service: LeaveService::new(
            authorization_service.clone(),
            repositories.leaves,
            repositories.policies.clone(),
            repositories.holidays.clone(),
            repositories.users,
            repositories.audit.clone(),
            clock,
        ),
        policy_service: PolicyService::new(
            authorization_service.clone(),
            repositories.policies,
            repositories.audit.clone(),
        ),
        holiday_service: HolidayService::new(
            authorization_service.clone(),
            repositories.holidays,
            repositories.audit,
        ),
        audit_log_service: AuditLogService::new(authorization_service, repositories.audit_log),
        rate_limit_service: RateLimitService::new(repositories.rate_limits),
        postgres_pool,
        frontend_url,
        bootstrap_token,
    }
}
