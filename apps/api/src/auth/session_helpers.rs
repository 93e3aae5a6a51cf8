use leavedesk_application::UserRecord;
use leavedesk_core::{AppError, UserIdentity};
use tower_sessions::Session;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

pub(super) fn identity_for(user: &UserRecord) -> UserIdentity {
    UserIdentity::new(user.id.to_string(), &user.email, &user.name)
}

/// Binds the user to a fresh session id.
pub(super) async fn establish_session(session: &Session, user: &UserRecord) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, identity_for(user))
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    Ok(())
}
