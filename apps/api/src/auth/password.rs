use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use leavedesk_application::AuthOutcome;
use leavedesk_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{ChangePasswordRequest, LoginRequest, MeResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session_helpers::establish_session;

/// POST /auth/login - Authenticate with email and password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<MeResponse>> {
    let outcome = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;

    match outcome {
        AuthOutcome::Authenticated(user) => {
            establish_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "user signed in");

            Ok(Json(MeResponse::from(user)))
        }
        // One message for every failure so accounts cannot be enumerated.
        AuthOutcome::Failed => {
            Err(AppError::Unauthorized("invalid email or password".to_owned()).into())
        }
    }
}

/// PUT /api/profile/password - Change the signed-in user's password.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .user_service
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
