use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use leavedesk_application::{
    AUDIT_LOG_MAX_LIMIT, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository,
};
use leavedesk_core::AppResult;

/// In-memory audit trail serving both the append and the read port.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let entry = AuditLogEntry::record(Uuid::new_v4().to_string(), event, Utc::now());
        self.entries.write().await.push(entry);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let limit = query.limit.clamp(1, AUDIT_LOG_MAX_LIMIT);

        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|entry| query.matches(entry))
            .skip(query.offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
