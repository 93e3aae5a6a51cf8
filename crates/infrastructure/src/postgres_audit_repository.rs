use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use leavedesk_application::{
    AUDIT_LOG_MAX_LIMIT, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository,
};
use leavedesk_core::AppResult;

use crate::map_sqlx_error;

/// Deepest page the audit log can be read at.
const MAX_OFFSET: usize = 10_000;

/// PostgreSQL audit trail. Rows are only ever inserted and read.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    subject: String,
    action: String,
    resource_type: String,
    resource_id: String,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditLogEntry {
    fn from(row: AuditRow) -> Self {
        Self {
            event_id: row.id.to_string(),
            recorded_at: row.created_at,
            subject: row.subject,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            detail: row.detail,
        }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (id, subject, action, resource_type, resource_id, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(event.subject.as_str())
        .bind(event.action.as_str())
        .bind(event.resource_type.as_str())
        .bind(event.resource_id.as_str())
        .bind(event.detail.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("append audit event", error))?;

        tracing::debug!(
            event_id = %id,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            "audit event recorded"
        );

        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let limit = i64::try_from(query.limit.clamp(1, AUDIT_LOG_MAX_LIMIT)).unwrap_or(50);
        let offset = i64::try_from(query.offset.min(MAX_OFFSET)).unwrap_or(0);

        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, subject, action, resource_type, resource_id, detail, created_at
            FROM audit_log_entries
            WHERE ($1::TEXT IS NULL OR action = $1)
              AND ($2::TEXT IS NULL OR subject = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.action)
        .bind(query.subject)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("list audit log entries", error))?;

        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }
}
