//! Throttle windows stored in `throttle_windows`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};

use leavedesk_application::{RateLimitRepository, RateWindow};
use leavedesk_core::{AppError, AppResult};

use crate::map_sqlx_error;

/// Shares throttle state between API replicas.
#[derive(Clone)]
pub struct PostgresRateLimitRepository {
    pool: PgPool,
}

impl PostgresRateLimitRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WindowRow {
    hits: i32,
    opened_at: DateTime<Utc>,
}

#[async_trait]
impl RateLimitRepository for PostgresRateLimitRepository {
    async fn register_hit(&self, bucket: &str, window: Duration) -> AppResult<RateWindow> {
        let row = sqlx::query_as::<_, WindowRow>(
            r#"
            INSERT INTO throttle_windows AS open_window (bucket, opened_at, hits)
            VALUES ($1, now(), 1)
            ON CONFLICT (bucket) DO UPDATE
            SET
                hits = CASE
                    WHEN open_window.opened_at + $2::FLOAT8 * INTERVAL '1 second' <= now() THEN 1
                    ELSE open_window.hits + 1
                END,
                opened_at = CASE
                    WHEN open_window.opened_at + $2::FLOAT8 * INTERVAL '1 second' <= now() THEN now()
                    ELSE open_window.opened_at
                END
            RETURNING hits, opened_at
            "#,
        )
        .bind(bucket)
        .bind(window.num_milliseconds() as f64 / 1000.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("register throttle hit", error))?;

        let hits = u32::try_from(row.hits)
            .map_err(|_| AppError::Internal(format!("negative hit count for '{bucket}'")))?;

        Ok(RateWindow {
            hits,
            opened_at: row.opened_at,
        })
    }

    async fn purge_windows_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let purged = sqlx::query("DELETE FROM throttle_windows WHERE opened_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|error| map_sqlx_error("purge throttle windows", error))?
            .rows_affected();

        Ok(purged)
    }
}
