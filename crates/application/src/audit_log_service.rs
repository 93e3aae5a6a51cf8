use std::sync::Arc;

use leavedesk_core::{AppResult, UserIdentity};
use leavedesk_domain::Permission;

use crate::{AuditLogEntry, AuditLogQuery, AuditLogRepository, AuthorizationService};

/// Application service for reading the audit trail.
#[derive(Clone)]
pub struct AuditLogService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditLogService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Lists audit entries newest first.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.authorization_service
            .require_permission(actor, Permission::AuditRead)
            .await?;

        self.repository
            .list_recent_entries(query.normalized()?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leavedesk_core::AppError;
    use leavedesk_domain::Role;

    use super::AuditLogService;
    use crate::test_fakes::{FakeAuditLogRepository, FakeUserRepository, identity_for, user_record};
    use crate::{AuditLogQuery, AuthorizationService};

    fn query(limit: usize) -> AuditLogQuery {
        AuditLogQuery {
            limit,
            offset: 0,
            action: Some("  ".to_owned()),
            subject: None,
        }
    }

    #[tokio::test]
    async fn limit_outside_range_is_rejected() {
        let head = user_record("Hugo", "hugo@example.com", Role::HrHead, "People");
        let users = Arc::new(FakeUserRepository::with_users(vec![head.clone()]));
        let service = AuditLogService::new(
            AuthorizationService::new(users),
            Arc::new(FakeAuditLogRepository::default()),
        );

        for limit in [0, 201] {
            let result = service.list_audit_log(&identity_for(&head), query(limit)).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn blank_filters_are_dropped() {
        let head = user_record("Hugo", "hugo@example.com", Role::HrHead, "People");
        let users = Arc::new(FakeUserRepository::with_users(vec![head.clone()]));
        let repository = Arc::new(FakeAuditLogRepository::default());
        let service = AuditLogService::new(AuthorizationService::new(users), repository.clone());

        let result = service.list_audit_log(&identity_for(&head), query(50)).await;

        assert!(result.is_ok());
        let seen = repository.last_query.lock().await.clone();
        assert_eq!(seen.and_then(|query| query.action), None);
    }

    #[tokio::test]
    async fn employees_cannot_read_audit_log() {
        let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
        let users = Arc::new(FakeUserRepository::with_users(vec![employee.clone()]));
        let service = AuditLogService::new(
            AuthorizationService::new(users),
            Arc::new(FakeAuditLogRepository::default()),
        );

        let result = service
            .list_audit_log(&identity_for(&employee), query(50))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
