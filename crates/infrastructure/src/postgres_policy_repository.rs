use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use leavedesk_application::PolicyRepository;
use leavedesk_core::{AppError, AppResult};
use leavedesk_domain::{LeaveType, PolicyConfig, PolicyConfigInput};

use crate::map_sqlx_error;

/// PostgreSQL-backed repository for per-type leave policies.
#[derive(Clone)]
pub struct PostgresPolicyRepository {
    pool: PgPool,
}

impl PostgresPolicyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PolicyRow {
    leave_type: String,
    max_days: i16,
    min_days: i16,
    notice_days: i16,
    carry_limit: i16,
}

fn day_count(field: &str, value: i16) -> AppResult<u16> {
    u16::try_from(value)
        .map_err(|_| AppError::Internal(format!("stored policy {field} is negative: {value}")))
}

impl TryFrom<PolicyRow> for PolicyConfig {
    type Error = AppError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        PolicyConfig::new(PolicyConfigInput {
            leave_type: LeaveType::from_str(row.leave_type.as_str())?,
            max_days: day_count("max_days", row.max_days)?,
            min_days: day_count("min_days", row.min_days)?,
            notice_days: day_count("notice_days", row.notice_days)?,
            carry_limit: day_count("carry_limit", row.carry_limit)?,
        })
    }
}

#[async_trait]
impl PolicyRepository for PostgresPolicyRepository {
    async fn list(&self) -> AppResult<Vec<PolicyConfig>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT leave_type, max_days, min_days, notice_days, carry_limit
            FROM policy_configs
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("list policies", error))?;

        let mut policies = rows
            .into_iter()
            .map(PolicyConfig::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        policies.sort_by_key(PolicyConfig::leave_type);
        Ok(policies)
    }

    async fn find(&self, leave_type: LeaveType) -> AppResult<Option<PolicyConfig>> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT leave_type, max_days, min_days, notice_days, carry_limit
            FROM policy_configs
            WHERE leave_type = $1
            "#,
        )
        .bind(leave_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("find policy", error))?;

        row.map(PolicyConfig::try_from).transpose()
    }

    async fn save(&self, policy: PolicyConfig) -> AppResult<PolicyConfig> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            INSERT INTO policy_configs (leave_type, max_days, min_days, notice_days, carry_limit)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (leave_type) DO UPDATE
            SET
                max_days = EXCLUDED.max_days,
                min_days = EXCLUDED.min_days,
                notice_days = EXCLUDED.notice_days,
                carry_limit = EXCLUDED.carry_limit,
                updated_at = now()
            RETURNING leave_type, max_days, min_days, notice_days, carry_limit
            "#,
        )
        .bind(policy.leave_type().as_str())
        .bind(i16::try_from(policy.max_days()).unwrap_or(i16::MAX))
        .bind(i16::try_from(policy.min_days()).unwrap_or(i16::MAX))
        .bind(i16::try_from(policy.notice_days()).unwrap_or(i16::MAX))
        .bind(i16::try_from(policy.carry_limit()).unwrap_or(i16::MAX))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("save policy", error))?;

        PolicyConfig::try_from(row)
    }
}
