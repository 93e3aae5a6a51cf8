use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use leavedesk_application::{HolidayRepository, PolicyRepository};
use leavedesk_core::{AppError, AppResult};
use leavedesk_domain::{Holiday, LeaveType, PolicyConfig, PolicyConfigInput};

/// In-memory policy table.
#[derive(Debug, Default)]
pub struct InMemoryPolicyRepository {
    policies: RwLock<BTreeMap<LeaveType, PolicyConfig>>,
}

impl InMemoryPolicyRepository {
    /// Creates an empty policy table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding the stock policies a fresh database is seeded with.
    pub fn with_defaults() -> AppResult<Self> {
        let defaults = [
            (LeaveType::Annual, 20, 1, 7, 5),
            (LeaveType::Casual, 10, 1, 1, 0),
            (LeaveType::Sick, 14, 1, 0, 0),
            (LeaveType::Maternity, 120, 1, 30, 0),
            (LeaveType::Paternity, 10, 1, 14, 0),
            (LeaveType::Unpaid, 60, 1, 14, 0),
        ];

        let mut policies = BTreeMap::new();
        for (leave_type, max_days, min_days, notice_days, carry_limit) in defaults {
            let policy = PolicyConfig::new(PolicyConfigInput {
                leave_type,
                max_days,
                min_days,
                notice_days,
                carry_limit,
            })?;
            policies.insert(leave_type, policy);
        }

        Ok(Self {
            policies: RwLock::new(policies),
        })
    }
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn list(&self) -> AppResult<Vec<PolicyConfig>> {
        Ok(self.policies.read().await.values().copied().collect())
    }

    async fn find(&self, leave_type: LeaveType) -> AppResult<Option<PolicyConfig>> {
        Ok(self.policies.read().await.get(&leave_type).copied())
    }

    async fn save(&self, policy: PolicyConfig) -> AppResult<PolicyConfig> {
        self.policies
            .write()
            .await
            .insert(policy.leave_type(), policy);
        Ok(policy)
    }
}

/// In-memory holiday calendar keyed by date.
#[derive(Debug, Default)]
pub struct InMemoryHolidayRepository {
    holidays: RwLock<BTreeMap<NaiveDate, Holiday>>,
}

impl InMemoryHolidayRepository {
    /// Creates an empty calendar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HolidayRepository for InMemoryHolidayRepository {
    async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Holiday>> {
        if end < start {
            return Ok(Vec::new());
        }

        Ok(self
            .holidays
            .read()
            .await
            .range(start..=end)
            .map(|(_, holiday)| holiday.clone())
            .collect())
    }

    async fn create(&self, holiday: Holiday) -> AppResult<Holiday> {
        let mut holidays = self.holidays.write().await;
        if holidays.contains_key(&holiday.date()) {
            return Err(AppError::Conflict(format!(
                "a holiday on {} already exists",
                holiday.date()
            )));
        }

        holidays.insert(holiday.date(), holiday.clone());
        Ok(holiday)
    }

    async fn delete(&self, date: NaiveDate) -> AppResult<bool> {
        Ok(self.holidays.write().await.remove(&date).is_some())
    }
}
