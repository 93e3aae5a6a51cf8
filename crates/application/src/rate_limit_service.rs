//! Fixed-window throttling of anonymous endpoints such as sign-in.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use leavedesk_core::{AppError, AppResult};

/// Hit counters keyed by `scope:client`.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Counts one hit against `bucket` and returns the window it landed in.
    ///
    /// A window older than `window` is closed and a new one opened at this hit.
    async fn register_hit(&self, bucket: &str, window: Duration) -> AppResult<RateWindow>;

    /// Drops windows opened before `cutoff`, returning how many were removed.
    async fn purge_windows_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// State of one bucket after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    /// Hits in the open window, the current one included.
    pub hits: u32,
    /// When the open window started.
    pub opened_at: DateTime<Utc>,
}

/// Budget applied to one throttled route.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    scope: &'static str,
    max_hits: u32,
    window: Duration,
}

impl RateLimitRule {
    /// Allows `max_hits` per client within each `window`.
    #[must_use]
    pub const fn new(scope: &'static str, max_hits: u32, window: Duration) -> Self {
        Self {
            scope,
            max_hits,
            window,
        }
    }

    fn bucket(&self, client: &str) -> String {
        format!("{}:{client}", self.scope)
    }
}

/// Admits or refuses throttled requests.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates the service over a counter store.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Counts the request and fails with [`AppError::RateLimited`] once the
    /// client has spent the rule's budget for the open window.
    pub async fn admit(&self, rule: RateLimitRule, client: &str) -> AppResult<()> {
        let bucket = rule.bucket(client);
        let window = self.repository.register_hit(&bucket, rule.window).await?;
        if window.hits <= rule.max_hits {
            return Ok(());
        }

        let retry_after = (window.opened_at + rule.window - Utc::now())
            .num_seconds()
            .max(1);
        tracing::warn!(bucket = %bucket, hits = window.hits, retry_after, "request throttled");

        Err(AppError::RateLimited(format!(
            "too many attempts, retry in {retry_after} seconds"
        )))
    }

    /// Forgets windows that have been closed for more than a day.
    pub async fn purge_stale(&self) -> AppResult<u64> {
        self.repository
            .purge_windows_before(Utc::now() - Duration::days(1))
            .await
    }
}
