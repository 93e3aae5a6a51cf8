use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use leavedesk_application::BootstrapInput;
use leavedesk_core::AppError;
use tower_sessions::Session;

use crate::dto::{BootstrapRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session_helpers::establish_session;

/// POST /auth/bootstrap - Create the first super admin and sign them in.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user = state
        .user_service
        .bootstrap_super_admin(BootstrapInput {
            name: payload.name,
            email: payload.email,
            department: payload.department,
            password: payload.password,
        })
        .await?;

    establish_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "super admin bootstrapped");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
