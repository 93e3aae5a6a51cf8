use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use leavedesk_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;
mod public_auth;

#[cfg(test)]
mod tests;

pub fn build_router<S>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/profile/password", put(auth::change_password_handler))
        .route(
            "/api/admin/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/admin/users/{user_id}",
            get(handlers::users::get_user_handler).put(handlers::users::update_user_handler),
        )
        .route(
            "/api/admin/users/{user_id}/deactivate",
            post(handlers::users::deactivate_user_handler),
        )
        .route(
            "/api/policies",
            get(handlers::policies::list_policies_handler),
        )
        .route(
            "/api/admin/policies/{leave_type}",
            get(handlers::policies::get_policy_handler)
                .put(handlers::policies::save_policy_handler),
        )
        .route(
            "/api/holidays",
            get(handlers::holidays::list_holidays_handler),
        )
        .route(
            "/api/admin/holidays",
            post(handlers::holidays::create_holiday_handler),
        )
        .route(
            "/api/admin/holidays/{date}",
            delete(handlers::holidays::delete_holiday_handler),
        )
        .route(
            "/api/admin/audit-log",
            get(handlers::audit::list_audit_log_handler),
        )
        .route(
            "/api/leaves",
            get(handlers::leaves::list_my_leaves_handler)
                .post(handlers::leaves::submit_leave_handler),
        )
        .route(
            "/api/leaves/all",
            get(handlers::leaves::list_all_leaves_handler),
        )
        .route(
            "/api/leaves/balances",
            get(handlers::leaves::balances_handler),
        )
        .route(
            "/api/leaves/{id}",
            get(handlers::leaves::get_leave_handler)
                .put(handlers::leaves::resubmit_leave_handler),
        )
        .route(
            "/api/leaves/{id}/{action}",
            post(handlers::leaves::leave_action_handler),
        )
        .route(
            "/api/approvals",
            get(handlers::approvals::approval_queue_handler),
        )
        .route(
            "/api/approvals/bulk",
            post(handlers::approvals::bulk_action_handler),
        )
        .route(
            "/api/dashboard",
            get(handlers::dashboard::dashboard_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .merge(public_auth::build_login_routes(app_state.clone()))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
