use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::post;
use chrono::Duration;
use leavedesk_application::RateLimitRule;

use crate::state::AppState;
use crate::{auth, middleware};

/// Sign-in attempts allowed per client address in each window.
pub(super) const LOGIN_MAX_ATTEMPTS: u32 = 10;
const LOGIN_WINDOW_MINUTES: i64 = 15;

/// `/auth/login`, throttled per client address.
pub(super) fn build_login_routes(app_state: AppState) -> Router<AppState> {
    let rule = RateLimitRule::new(
        "login",
        LOGIN_MAX_ATTEMPTS,
        Duration::minutes(LOGIN_WINDOW_MINUTES),
    );

    Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route_layer(from_fn_with_state(app_state, middleware::rate_limit))
        .layer(axum::Extension(rule))
}
