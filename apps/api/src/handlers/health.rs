use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{HealthDependencyStatus, HealthResponse};
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.postgres_pool.as_ref() {
        Some(pool) => check_postgres(pool).await,
        None => HealthDependencyStatus {
            status: "disabled",
            detail: None,
        },
    };

    let ready = database.status != "error";
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: if ready { "ok" } else { "degraded" },
            ready,
            database,
        }),
    )
}

async fn check_postgres(pool: &sqlx::PgPool) -> HealthDependencyStatus {
    let check = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    match check {
        Ok(_) => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Err(error) => {
            tracing::warn!(error = %error, "database health check failed");
            HealthDependencyStatus {
                status: "error",
                detail: Some(format!("postgres check failed: {error}")),
            }
        }
    }
}
