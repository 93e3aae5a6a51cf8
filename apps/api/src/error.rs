use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leavedesk_core::AppError;
use serde::Serialize;
use ts_rs::TS;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    /// Stable machine-readable category, e.g. `conflict`.
    code: String,
    message: String,
}

/// Handler error; converts from [`AppError`] so services can be called with `?`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn classify(error: &AppError) -> (StatusCode, &'static str) {
    match error {
        AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
        AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = classify(&self.0);
        let message = if let AppError::Internal(detail) = &self.0 {
            // Never leak storage or hashing details to clients.
            tracing::error!(error = %detail, "internal error while handling request");
            "internal server error".to_owned()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse {
            code: code.to_owned(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
