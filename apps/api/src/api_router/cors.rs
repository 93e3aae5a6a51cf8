use std::time::Duration;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use leavedesk_core::{AppError, AppResult};
use tower_http::cors::CorsLayer;

/// Credentialed CORS for the single frontend origin.
pub(super) fn build_cors_layer(frontend_url: &str) -> AppResult<CorsLayer> {
    let origin = frontend_url.trim_end_matches('/');
    let allowed_origin = HeaderValue::from_str(origin).map_err(|error| {
        AppError::Internal(format!("FRONTEND_URL '{origin}' is not a valid origin: {error}"))
    })?;

    Ok(CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .max_age(Duration::from_secs(10 * 60)))
}

#[cfg(test)]
mod tests {
    use super::build_cors_layer;

    #[test]
    fn trailing_slash_is_accepted_and_garbage_is_not() {
        assert!(build_cors_layer("http://localhost:3000/").is_ok());
        assert!(build_cors_layer("http://bad\norigin").is_err());
    }
}
