use thiserror::Error;

/// Shorthand used by services, repositories and handlers alike.
pub type AppResult<T> = Result<T, AppError>;

/// Failure categories. The HTTP layer maps each one to a status code, so
/// pick the variant by what the caller did wrong, not by where it failed.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input, or a request that breaks a business rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, or hidden from the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate data or a stale workflow step.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No session, bad credentials or an inactive account.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Signed in but the role lacks the permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Throttled; retry later.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Storage, hashing or other infrastructure failure.
    #[error("internal error: {0}")]
    Internal(String),
}
