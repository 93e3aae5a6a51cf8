use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use leavedesk_application::{RateLimitRepository, RateWindow};
use leavedesk_core::AppResult;

/// Process-local throttle windows.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    buckets: Mutex<HashMap<String, RateWindow>>,
}

impl InMemoryRateLimitRepository {
    /// Creates a store with no open windows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn register_hit(&self, bucket: &str, window: Duration) -> AppResult<RateWindow> {
        let now = Utc::now();
        let mut buckets = self.buckets.lock().await;

        let entry = buckets
            .entry(bucket.to_owned())
            .and_modify(|open| {
                if open.opened_at + window <= now {
                    *open = RateWindow {
                        hits: 0,
                        opened_at: now,
                    };
                }
            })
            .or_insert(RateWindow {
                hits: 0,
                opened_at: now,
            });
        entry.hits += 1;

        Ok(*entry)
    }

    async fn purge_windows_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, open| open.opened_at >= cutoff);

        Ok((before - buckets.len()) as u64)
    }
}
