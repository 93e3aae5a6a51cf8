use chrono::SecondsFormat;
use leavedesk_application::AuditLogEntry;
use serde::Serialize;
use ts_rs::TS;

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub subject: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(entry: AuditLogEntry) -> Self {
        Self {
            event_id: entry.event_id,
            subject: entry.subject,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            detail: entry.detail,
            created_at: entry
                .recorded_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
