//! PostgreSQL-backed leave request store.
//!
//! The approval history lives in a JSONB column next to the request row so a
//! transition is a single conditional `UPDATE`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use leavedesk_application::{
    LeaveQuery, LeaveRepository, LeaveUsage, Page, ReviewQueueQuery, StatusCount,
};
use leavedesk_core::{AppError, AppResult};
use leavedesk_domain::{
    ApprovalRecord, ApprovalStage, DateRange, LeaveRequest, LeaveRequestId, LeaveRequestParts,
    LeaveStatus, LeaveType, Transition, UserId,
};

use crate::{map_sqlx_error, sql_page_window};

const LEAVE_COLUMNS: &str = "id, requester_id, requester_name, department, leave_type, \
     start_date, end_date, working_days, reason, status, current_stage, approvals, \
     created_at, updated_at";

const ACTIVE_STATUSES: &str = "('submitted', 'pending', 'approved')";

/// PostgreSQL implementation of the leave repository port.
#[derive(Clone)]
pub struct PostgresLeaveRepository {
    pool: PgPool,
}

impl PostgresLeaveRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LeaveRow {
    id: Uuid,
    requester_id: Uuid,
    requester_name: String,
    department: String,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    working_days: i16,
    reason: String,
    status: String,
    current_stage: Option<String>,
    approvals: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = AppError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let approvals: Vec<ApprovalRecord> =
            serde_json::from_value(row.approvals).map_err(|error| {
                AppError::Internal(format!(
                    "leave request '{}' has malformed approvals: {error}",
                    row.id
                ))
            })?;
        let working_days = u16::try_from(row.working_days).map_err(|_| {
            AppError::Internal(format!(
                "leave request '{}' has negative working days",
                row.id
            ))
        })?;

        LeaveRequest::restore(LeaveRequestParts {
            id: LeaveRequestId::from_uuid(row.id),
            requester_id: UserId::from_uuid(row.requester_id),
            requester_name: row.requester_name,
            department: row.department,
            leave_type: LeaveType::from_str(row.leave_type.as_str())?,
            range: DateRange::new(row.start_date, row.end_date)?,
            working_days,
            reason: row.reason,
            status: LeaveStatus::from_str(row.status.as_str())?,
            current_stage: row
                .current_stage
                .as_deref()
                .map(ApprovalStage::from_str)
                .transpose()?,
            approvals,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UsageRow {
    leave_type: String,
    status: String,
    working_days: i64,
}

#[derive(Debug, FromRow)]
struct StatusCountRow {
    status: String,
    total: i64,
}

fn approvals_json(request: &LeaveRequest) -> AppResult<serde_json::Value> {
    serde_json::to_value(request.approvals()).map_err(|error| {
        AppError::Internal(format!(
            "failed to serialize approvals of '{}': {error}",
            request.id()
        ))
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl LeaveRepository for PostgresLeaveRepository {
    async fn create(&self, request: &LeaveRequest) -> AppResult<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO leave_requests ({LEAVE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#
        ))
        .bind(request.id().as_uuid())
        .bind(request.requester_id().as_uuid())
        .bind(request.requester_name())
        .bind(request.department())
        .bind(request.leave_type().as_str())
        .bind(request.range().start())
        .bind(request.range().end())
        .bind(i16::try_from(request.working_days()).unwrap_or(i16::MAX))
        .bind(request.reason())
        .bind(request.status().as_str())
        .bind(request.current_stage().map(|stage| stage.as_str()))
        .bind(approvals_json(request)?)
        .bind(request.created_at())
        .bind(request.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("create leave request", error))?;

        Ok(())
    }

    async fn find_by_id(&self, id: LeaveRequestId) -> AppResult<Option<LeaveRequest>> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("find leave request", error))?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn save_transition(&self, request: &LeaveRequest, step: Transition) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET
                leave_type = $2,
                start_date = $3,
                end_date = $4,
                working_days = $5,
                reason = $6,
                status = $7,
                current_stage = $8,
                approvals = $9,
                updated_at = $10
            WHERE id = $1
                AND status = $11
                AND current_stage IS NOT DISTINCT FROM $12
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.leave_type().as_str())
        .bind(request.range().start())
        .bind(request.range().end())
        .bind(i16::try_from(request.working_days()).unwrap_or(i16::MAX))
        .bind(request.reason())
        .bind(request.status().as_str())
        .bind(request.current_stage().map(|stage| stage.as_str()))
        .bind(approvals_json(request)?)
        .bind(request.updated_at())
        .bind(step.from.as_str())
        .bind(step.stage.map(|stage| stage.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("save leave transition", error))?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                leave_request_id = %request.id(),
                expected_status = step.from.as_str(),
                "leave transition lost a concurrent update"
            );
            return Err(AppError::Conflict(format!(
                "leave request '{}' was changed by someone else; reload and try again",
                request.id()
            )));
        }

        Ok(())
    }

    async fn list(&self, query: LeaveQuery) -> AppResult<Page<LeaveRequest>> {
        let filter = r#"
            WHERE ($1::UUID IS NULL OR requester_id = $1)
                AND ($2::TEXT IS NULL OR status = $2)
                AND ($3::TEXT IS NULL OR leave_type = $3)
                AND ($4::TEXT IS NULL OR lower(department) = lower($4))
                AND ($5::DATE IS NULL OR start_date >= $5)
                AND ($6::DATE IS NULL OR start_date <= $6)
        "#;
        let requester_id = query.requester_id.map(|id| id.as_uuid());
        let status = query.status.map(|status| status.as_str());
        let leave_type = query.leave_type.map(|leave_type| leave_type.as_str());
        let department = non_blank(query.department.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM leave_requests {filter}"
        ))
        .bind(requester_id)
        .bind(status)
        .bind(leave_type)
        .bind(department)
        .bind(query.starts_from)
        .bind(query.starts_until)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("count leave requests", error))?;

        let (limit, offset) = sql_page_window("leave request", query.limit, query.offset)?;
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS}
            FROM leave_requests
            {filter}
            ORDER BY created_at DESC, id DESC
            LIMIT $7 OFFSET $8
            "#
        ))
        .bind(requester_id)
        .bind(status)
        .bind(leave_type)
        .bind(department)
        .bind(query.starts_from)
        .bind(query.starts_until)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("list leave requests", error))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(LeaveRequest::try_from)
                .collect::<AppResult<Vec<_>>>()?,
            total: to_u64(total),
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn list_review_queue(&self, query: ReviewQueueQuery) -> AppResult<Page<LeaveRequest>> {
        if query.stages.is_empty() {
            return Ok(Page::empty(query.limit, query.offset));
        }

        let filter = r#"
            WHERE status IN ('submitted', 'pending')
                AND current_stage = ANY($1)
                AND requester_id <> $2
                AND (
                    $3::TEXT IS NULL
                    OR current_stage <> 'department_head'
                    OR lower(department) = lower($3)
                )
        "#;
        let stages: Vec<String> = query
            .stages
            .iter()
            .map(|stage| stage.as_str().to_owned())
            .collect();
        let department = non_blank(query.department.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM leave_requests {filter}"
        ))
        .bind(&stages)
        .bind(query.exclude_requester.as_uuid())
        .bind(department)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("count review queue", error))?;

        let (limit, offset) = sql_page_window("review queue", query.limit, query.offset)?;
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS}
            FROM leave_requests
            {filter}
            ORDER BY created_at, id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(&stages)
        .bind(query.exclude_requester.as_uuid())
        .bind(department)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("list review queue", error))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(LeaveRequest::try_from)
                .collect::<AppResult<Vec<_>>>()?,
            total: to_u64(total),
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn find_active_overlapping(
        &self,
        requester_id: UserId,
        range: DateRange,
    ) -> AppResult<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS}
            FROM leave_requests
            WHERE requester_id = $1
                AND status IN {ACTIVE_STATUSES}
                AND start_date <= $3
                AND end_date >= $2
            ORDER BY start_date
            "#
        ))
        .bind(requester_id.as_uuid())
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("find overlapping leave", error))?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn usage_for_requester(
        &self,
        requester_id: UserId,
        year: i32,
    ) -> AppResult<Vec<LeaveUsage>> {
        let rows = sqlx::query_as::<_, UsageRow>(&format!(
            r#"
            SELECT leave_type, status, SUM(working_days)::BIGINT AS working_days
            FROM leave_requests
            WHERE requester_id = $1
                AND status IN {ACTIVE_STATUSES}
                AND start_date >= make_date($2, 1, 1)
                AND start_date < make_date($2 + 1, 1, 1)
            GROUP BY leave_type, status
            "#
        ))
        .bind(requester_id.as_uuid())
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("sum leave usage", error))?;

        rows.into_iter()
            .map(|row| {
                Ok(LeaveUsage {
                    leave_type: LeaveType::from_str(row.leave_type.as_str())?,
                    status: LeaveStatus::from_str(row.status.as_str())?,
                    working_days: u32::try_from(row.working_days).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn count_by_status(&self, requester_id: Option<UserId>) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"
            SELECT status, COUNT(*) AS total
            FROM leave_requests
            WHERE $1::UUID IS NULL OR requester_id = $1
            GROUP BY status
            "#,
        )
        .bind(requester_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("count leave requests by status", error))?;

        let mut counts = rows
            .into_iter()
            .map(|row| {
                Ok(StatusCount {
                    status: LeaveStatus::from_str(row.status.as_str())?,
                    count: to_u64(row.total),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        counts.sort_by_key(|entry| entry.status);
        Ok(counts)
    }

    async fn count_on_leave(&self, date: NaiveDate) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT requester_id)
            FROM leave_requests
            WHERE status = 'approved' AND start_date <= $1 AND end_date >= $1
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("count people on leave", error))?;

        Ok(to_u64(total))
    }
}
