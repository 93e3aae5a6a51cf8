use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use leavedesk_core::{AppError, AppResult, UserIdentity};
use leavedesk_domain::{AuditAction, Holiday, Permission};

use crate::{AuditEvent, AuditRepository, AuthorizationService};

/// Repository port for public holidays.
#[async_trait]
pub trait HolidayRepository: Send + Sync {
    /// Lists holidays between two dates inclusive, ordered by date.
    async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Holiday>>;

    /// Inserts a holiday. A second holiday on the same date is a conflict.
    async fn create(&self, holiday: Holiday) -> AppResult<Holiday>;

    /// Deletes the holiday on `date`, returning whether one existed.
    async fn delete(&self, date: NaiveDate) -> AppResult<bool>;
}

/// Application service for the holiday calendar.
#[derive(Clone)]
pub struct HolidayService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn HolidayRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl HolidayService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn HolidayRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    /// Lists the holidays of one calendar year.
    pub async fn list_holidays(&self, actor: &UserIdentity, year: i32) -> AppResult<Vec<Holiday>> {
        self.authorization_service.resolve_actor(actor).await?;

        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Err(AppError::Validation(format!("year {year} is out of range")));
        };

        self.repository.list_between(start, end).await
    }

    /// Adds a holiday to the calendar.
    pub async fn create_holiday(
        &self,
        actor: &UserIdentity,
        date: NaiveDate,
        name: String,
    ) -> AppResult<Holiday> {
        self.authorization_service
            .require_permission(actor, Permission::HolidayManage)
            .await?;

        let holiday = self.repository.create(Holiday::new(date, name)?).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::HolidayCreated,
                resource_type: "holiday".to_owned(),
                resource_id: holiday.date().to_string(),
                detail: Some(holiday.name().to_string()),
            })
            .await?;

        Ok(holiday)
    }

    /// Removes the holiday on `date`.
    pub async fn delete_holiday(&self, actor: &UserIdentity, date: NaiveDate) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, Permission::HolidayManage)
            .await?;

        if !self.repository.delete(date).await? {
            return Err(AppError::NotFound(format!("no holiday on {date}")));
        }

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::HolidayDeleted,
                resource_type: "holiday".to_owned(),
                resource_id: date.to_string(),
                detail: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use leavedesk_core::AppError;
    use leavedesk_domain::Role;

    use super::HolidayService;
    use crate::AuthorizationService;
    use crate::test_fakes::{
        FakeAuditRepository, FakeHolidayRepository, FakeUserRepository, identity_for, user_record,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| panic!("invalid test date"))
    }

    #[tokio::test]
    async fn duplicate_holiday_date_conflicts() {
        let hr = user_record("Hana", "hana@example.com", Role::HrAdmin, "People");
        let users = Arc::new(FakeUserRepository::with_users(vec![hr.clone()]));
        let audit = Arc::new(FakeAuditRepository::default());
        let service = HolidayService::new(
            AuthorizationService::new(users),
            Arc::new(FakeHolidayRepository::default()),
            audit.clone(),
        );
        let actor = identity_for(&hr);

        let first = service
            .create_holiday(&actor, date(2026, 12, 25), "Christmas Day".to_owned())
            .await;
        let second = service
            .create_holiday(&actor, date(2026, 12, 25), "Duplicate".to_owned())
            .await;

        assert!(first.is_ok());
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(audit.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn listing_is_scoped_to_year() {
        let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
        let hr = user_record("Hana", "hana@example.com", Role::HrAdmin, "People");
        let users = Arc::new(FakeUserRepository::with_users(vec![
            employee.clone(),
            hr.clone(),
        ]));
        let service = HolidayService::new(
            AuthorizationService::new(users),
            Arc::new(FakeHolidayRepository::default()),
            Arc::new(FakeAuditRepository::default()),
        );
        for (day, name) in [
            (date(2025, 12, 25), "Christmas 2025"),
            (date(2026, 1, 1), "New Year"),
        ] {
            assert!(
                service
                    .create_holiday(&identity_for(&hr), day, name.to_owned())
                    .await
                    .is_ok()
            );
        }

        let listed = service
            .list_holidays(&identity_for(&employee), 2026)
            .await
            .unwrap_or_else(|error| panic!("list failed: {error}"));

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].date(), date(2026, 1, 1));
    }

    #[tokio::test]
    async fn employees_cannot_delete_holidays() {
        let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
        let users = Arc::new(FakeUserRepository::with_users(vec![employee.clone()]));
        let service = HolidayService::new(
            AuthorizationService::new(users),
            Arc::new(FakeHolidayRepository::default()),
            Arc::new(FakeAuditRepository::default()),
        );

        let result = service
            .delete_holiday(&identity_for(&employee), date(2026, 1, 1))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
