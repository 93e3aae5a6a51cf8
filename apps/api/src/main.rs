//! Leave desk API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use leavedesk_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, build_postgres_session_layer, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_layer = build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;
    let app_state = build_app_state(&config, pool);

    match app_state.rate_limit_service.purge_stale().await {
        Ok(removed) => info!(removed, "stale throttle windows purged"),
        Err(error) => tracing::warn!(error = %error, "throttle window purge failed"),
    }

    let app = build_router(app_state, &config.frontend_url, session_layer)?;

    let address = config.socket_address();
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "leavedesk-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
