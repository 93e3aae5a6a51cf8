//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_repository;
mod postgres_audit_repository;
mod postgres_holiday_repository;
mod postgres_leave_repository;
mod postgres_policy_repository;
mod postgres_rate_limit_repository;
mod postgres_user_repository;
#[cfg(test)]
mod test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_repository::{
    InMemoryAuditRepository, InMemoryHolidayRepository, InMemoryLeaveRepository,
    InMemoryPolicyRepository, InMemoryRateLimitRepository, InMemoryUserRepository,
};
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_holiday_repository::PostgresHolidayRepository;
pub use postgres_leave_repository::PostgresLeaveRepository;
pub use postgres_policy_repository::PostgresPolicyRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_user_repository::PostgresUserRepository;

/// Maps a database driver error to the application error taxonomy.
///
/// Unique violations become conflicts; everything else is internal.
pub(crate) fn map_sqlx_error(context: &str, error: sqlx::Error) -> leavedesk_core::AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.is_unique_violation()
    {
        return leavedesk_core::AppError::Conflict(format!("{context}: already exists"));
    }

    leavedesk_core::AppError::Internal(format!("failed to {context}: {error}"))
}

/// Converts a page window to the `BIGINT` values bound for `LIMIT`/`OFFSET`.
pub(crate) fn sql_page_window(
    listing: &str,
    limit: usize,
    offset: usize,
) -> leavedesk_core::AppResult<(i64, i64)> {
    let limit = i64::try_from(limit).map_err(|error| {
        leavedesk_core::AppError::Validation(format!("invalid {listing} limit: {error}"))
    })?;
    let offset = i64::try_from(offset).map_err(|error| {
        leavedesk_core::AppError::Validation(format!("invalid {listing} offset: {error}"))
    })?;

    Ok((limit, offset))
}
