//! Append-only audit trail: what services write and what HR reads back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leavedesk_core::{AppError, AppResult};
use leavedesk_domain::AuditAction;

/// Largest page the audit log can be read with.
pub const AUDIT_LOG_MAX_LIMIT: usize = 200;

/// One state-changing operation, recorded after it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Id of the user who acted.
    pub subject: String,
    pub action: AuditAction,
    /// `leave_request`, `user`, `policy` or `holiday`.
    pub resource_type: String,
    pub resource_id: String,
    /// Free text such as a review comment.
    pub detail: Option<String>,
}

/// A stored [`AuditEvent`] as returned to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub event_id: String,
    pub recorded_at: DateTime<Utc>,
    pub subject: String,
    /// Dotted action name, e.g. `leave.approved`.
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
}

impl AuditLogEntry {
    /// Stamps an event with its storage id and time.
    #[must_use]
    pub fn record(
        event_id: impl Into<String>,
        event: AuditEvent,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            recorded_at,
            subject: event.subject,
            action: event.action.as_str().to_owned(),
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            detail: event.detail,
        }
    }
}

/// Filters and window for reading the trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    pub limit: usize,
    pub offset: usize,
    pub action: Option<String>,
    pub subject: Option<String>,
}

impl AuditLogQuery {
    /// Whether an entry passes the action and subject filters.
    #[must_use]
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        let action_ok = self.action.as_deref().is_none_or(|action| entry.action == action);
        let subject_ok = self
            .subject
            .as_deref()
            .is_none_or(|subject| entry.subject == subject);
        action_ok && subject_ok
    }

    /// Rejects an out-of-range limit and drops blank filters.
    pub(crate) fn normalized(self) -> AppResult<Self> {
        if !(1..=AUDIT_LOG_MAX_LIMIT).contains(&self.limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {AUDIT_LOG_MAX_LIMIT}"
            )));
        }

        let non_blank = |value: Option<String>| {
            value
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            action: non_blank(self.action),
            subject: non_blank(self.subject),
            ..self
        })
    }
}

/// Write side of the trail.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one event. Stored events are never changed.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Read side of the trail.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Entries matching `query`, newest first.
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}
