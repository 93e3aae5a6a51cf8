//! PostgreSQL-backed user directory.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use leavedesk_application::{NewUserRecord, Page, UserQuery, UserRecord, UserRepository};
use leavedesk_core::{AppError, AppResult};
use leavedesk_domain::{Role, UserId};

use crate::{map_sqlx_error, sql_page_window};

const USER_COLUMNS: &str =
    "id, name, email, role, department, password_hash, is_active, created_at, updated_at";

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    department: String,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(row.role.as_str()).map_err(|error| {
            AppError::Internal(format!("user '{}' has an invalid role: {error}", row.id))
        })?;

        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            role,
            department: row.department,
            password_hash: row.password_hash,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            let escaped = value
                .to_lowercase()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("find user by email", error))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("find user by id", error))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, role, department, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new().as_uuid())
        .bind(user.name)
        .bind(user.email)
        .bind(user.role.as_str())
        .bind(user.department)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("create user", error))?;

        UserRecord::try_from(row)
    }

    async fn update(&self, user: &UserRecord) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $2, role = $3, department = $4, is_active = $5, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.role.as_str())
        .bind(user.department.as_str())
        .bind(user.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("update user", error))?
        .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", user.id)))?;

        UserRecord::try_from(row)
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("update password", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        }

        Ok(())
    }

    async fn list(&self, query: UserQuery) -> AppResult<Page<UserRecord>> {
        let pattern = search_pattern(query.search.as_deref());
        let role = query.role.map(|role| role.as_str());
        let department = query
            .department
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let filter = r#"
            WHERE ($1::BOOLEAN OR is_active)
                AND ($2::TEXT IS NULL OR lower(name) LIKE $2 OR lower(email) LIKE $2)
                AND ($3::TEXT IS NULL OR role = $3)
                AND ($4::TEXT IS NULL OR lower(department) = lower($4))
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {filter}"))
            .bind(query.include_inactive)
            .bind(pattern.as_deref())
            .bind(role)
            .bind(department)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| map_sqlx_error("count users", error))?;

        let (limit, offset) = sql_page_window("user", query.limit, query.offset)?;
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users {filter} ORDER BY lower(name), id LIMIT $5 OFFSET $6"
        ))
        .bind(query.include_inactive)
        .bind(pattern.as_deref())
        .bind(role)
        .bind(department)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("list users", error))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(UserRecord::try_from)
                .collect::<AppResult<Vec<_>>>()?,
            total: u64::try_from(total).unwrap_or_default(),
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| map_sqlx_error("count users", error))?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn has_active_department_head(&self, department: &str) -> AppResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE is_active
                    AND role = 'department_head'
                    AND lower(department) = lower($1)
            )
            "#,
        )
        .bind(department.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("look up department head", error))
    }
}
