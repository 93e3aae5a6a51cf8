use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use leavedesk_application::HolidayRepository;
use leavedesk_core::AppResult;
use leavedesk_domain::Holiday;

use crate::map_sqlx_error;

/// PostgreSQL-backed holiday calendar.
#[derive(Clone)]
pub struct PostgresHolidayRepository {
    pool: PgPool,
}

impl PostgresHolidayRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct HolidayRow {
    holiday_date: NaiveDate,
    name: String,
}

#[async_trait]
impl HolidayRepository for PostgresHolidayRepository {
    async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Holiday>> {
        let rows = sqlx::query_as::<_, HolidayRow>(
            r#"
            SELECT holiday_date, name
            FROM holidays
            WHERE holiday_date BETWEEN $1 AND $2
            ORDER BY holiday_date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error("list holidays", error))?;

        rows.into_iter()
            .map(|row| Holiday::new(row.holiday_date, row.name))
            .collect()
    }

    async fn create(&self, holiday: Holiday) -> AppResult<Holiday> {
        sqlx::query("INSERT INTO holidays (holiday_date, name) VALUES ($1, $2)")
            .bind(holiday.date())
            .bind(holiday.name().as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| map_sqlx_error("create holiday", error))?;

        Ok(holiday)
    }

    async fn delete(&self, date: NaiveDate) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM holidays WHERE holiday_date = $1")
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(|error| map_sqlx_error("delete holiday", error))?;

        Ok(result.rows_affected() > 0)
    }
}
