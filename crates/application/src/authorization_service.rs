use std::str::FromStr;
use std::sync::Arc;

use leavedesk_core::{AppError, AppResult, UserIdentity};
use leavedesk_domain::{Permission, UserId};

use crate::{UserRecord, UserRepository};

/// Application service resolving the acting user and checking grants.
///
/// Roles are read from the directory on every call, so a role change or a
/// deactivation takes effect without waiting for the session to expire.
#[derive(Clone)]
pub struct AuthorizationService {
    user_repository: Arc<dyn UserRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Resolves the active user behind a session identity.
    pub async fn resolve_actor(&self, actor: &UserIdentity) -> AppResult<UserRecord> {
        let user_id = UserId::from_str(actor.subject())
            .map_err(|_| AppError::Unauthorized("session subject is not a user id".to_owned()))?;

        match self.user_repository.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AppError::Unauthorized(
                "user account is deactivated".to_owned(),
            )),
            None => Err(AppError::Unauthorized("user account not found".to_owned())),
        }
    }

    /// Ensures the actor holds a permission and returns their record.
    pub async fn require_permission(
        &self,
        actor: &UserIdentity,
        permission: Permission,
    ) -> AppResult<UserRecord> {
        let user = self.resolve_actor(actor).await?;
        if !user.role.grants(permission) {
            return Err(AppError::Forbidden(format!(
                "role '{}' is missing permission '{}'",
                user.role.as_str(),
                permission.as_str()
            )));
        }

        Ok(user)
    }

    /// Returns whether the actor currently holds a permission.
    pub async fn has_permission(
        &self,
        actor: &UserIdentity,
        permission: Permission,
    ) -> AppResult<bool> {
        let user = self.resolve_actor(actor).await?;
        Ok(user.role.grants(permission))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leavedesk_core::{AppError, UserIdentity};
    use leavedesk_domain::{Permission, Role};

    use super::AuthorizationService;
    use crate::test_fakes::{FakeUserRepository, identity_for, user_record};

    #[tokio::test]
    async fn require_permission_names_missing_grant() {
        let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
        let users = Arc::new(FakeUserRepository::with_users(vec![employee.clone()]));
        let service = AuthorizationService::new(users);

        let result = service
            .require_permission(&identity_for(&employee), Permission::UserManage)
            .await;

        match result {
            Err(AppError::Forbidden(message)) => assert!(message.contains("user.manage")),
            other => panic!("expected forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deactivated_user_is_unauthorized() {
        let mut admin = user_record("Grace", "grace@example.com", Role::HrAdmin, "People");
        admin.is_active = false;
        let users = Arc::new(FakeUserRepository::with_users(vec![admin.clone()]));
        let service = AuthorizationService::new(users);

        let result = service
            .require_permission(&identity_for(&admin), Permission::UserManage)
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn malformed_subject_is_unauthorized() {
        let service = AuthorizationService::new(Arc::new(FakeUserRepository::default()));

        let result = service
            .resolve_actor(&UserIdentity::new("not-a-uuid", "ghost@leavedesk.test", "Ghost"))
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
