use leavedesk_core::{AppError, AppResult};
use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

const SESSION_COOKIE: &str = "leavedesk_session";
const SESSION_TABLE: &str = "leavedesk_sessions";
/// A working day; idle sessions expire overnight.
const IDLE_TIMEOUT_HOURS: i64 = 8;

/// Sessions persisted next to the application tables.
pub async fn build_postgres_session_layer(
    pool: PgPool,
    cookie_secure: bool,
) -> AppResult<SessionManagerLayer<PostgresStore>> {
    let store = PostgresStore::new(pool)
        .with_table_name(SESSION_TABLE)
        .map_err(|error| AppError::Internal(format!("bad session table name: {error}")))?;
    store
        .migrate()
        .await
        .map_err(|error| AppError::Internal(format!("session table migration failed: {error}")))?;

    Ok(session_layer(store, cookie_secure))
}

/// Cookie policy used with any store, including the in-memory one in tests.
pub fn session_layer<S: SessionStore + Clone>(
    store: S,
    cookie_secure: bool,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(cookie_secure)
        .with_expiry(Expiry::OnInactivity(Duration::hours(IDLE_TIMEOUT_HOURS)))
}
