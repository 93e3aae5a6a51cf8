use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use leavedesk_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::MeResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// Ends the session. Succeeds even when nobody was signed in.
pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let signed_in: Option<UserIdentity> = session
        .get(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("session read failed: {error}")))?;

    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("session flush failed: {error}")))?;

    if let Some(identity) = signed_in {
        tracing::info!(user = %identity, user_id = identity.subject(), "signed out");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<MeResponse>> {
    let record = state.user_service.current_user(&user).await?;
    Ok(Json(MeResponse::from(record)))
}
