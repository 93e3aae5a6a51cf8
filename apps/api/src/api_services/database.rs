use std::time::Duration;

use leavedesk_core::{AppError, AppResult};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::api_config::ApiConfig;

static MIGRATOR: Migrator = sqlx::migrate!("../../crates/infrastructure/migrations");

/// Opens the shared pool and brings the schema up to date before serving.
pub async fn connect_and_migrate(config: &ApiConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("database unreachable: {error}")))?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("schema migration failed: {error}")))?;

    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        max_connections = config.database_max_connections,
        "database ready"
    );

    Ok(pool)
}
