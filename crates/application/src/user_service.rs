//! User directory administration and password authentication.

use std::sync::Arc;

use leavedesk_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use leavedesk_domain::{AuditAction, EmailAddress, Permission, Role, UserId, validate_password};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, NewUserRecord, Page, PasswordHasher,
    USER_NAME_MAX_CHARS, UserQuery, UserRecord, UserRepository,
};

mod login;

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Authentication succeeded.
    Authenticated(UserRecord),
    /// Authentication failed. The reason is deliberately not exposed.
    Failed,
}

/// Input for creating a user from the admin console.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Organisational role.
    pub role: Role,
    /// Department.
    pub department: String,
    /// Initial password.
    pub password: String,
}

/// Partial update of a user. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New display name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New department.
    pub department: Option<String>,
}

/// Input for creating the first super admin.
#[derive(Debug, Clone)]
pub struct BootstrapInput {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Department.
    pub department: String,
    /// Password.
    pub password: String,
}

/// Application service for the user directory.
#[derive(Clone)]
pub struct UserService {
    authorization_service: AuthorizationService,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            user_repository,
            password_hasher,
            audit_repository,
        }
    }

    /// Creates a user. Only a super admin may create another super admin.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<UserRecord> {
        let admin = self
            .authorization_service
            .require_permission(actor, Permission::UserManage)
            .await?;
        require_super_admin_for(&admin, input.role)?;

        let new_user = self.validated_new_user(
            input.name,
            input.email,
            input.role,
            input.department,
            input.password.as_str(),
        )?;
        if self
            .user_repository
            .find_by_email(new_user.email.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                new_user.email
            )));
        }

        let user = self.user_repository.create(new_user).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::UserCreated,
                resource_type: "user".to_owned(),
                resource_id: user.id.to_string(),
                detail: Some(format!(
                    "created '{}' as {} in {}",
                    user.email,
                    user.role.as_str(),
                    user.department
                )),
            })
            .await?;

        Ok(user)
    }

    /// Updates name, role or department of a user.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<UserRecord> {
        let admin = self
            .authorization_service
            .require_permission(actor, Permission::UserManage)
            .await?;
        let mut user = self.find_existing(user_id).await?;
        require_super_admin_for(&admin, user.role)?;

        if let Some(role) = input.role {
            if role != user.role && admin.id == user.id {
                return Err(AppError::Forbidden(
                    "you cannot change your own role".to_owned(),
                ));
            }
            require_super_admin_for(&admin, role)?;
            user.role = role;
        }
        if let Some(name) = input.name {
            user.name = bounded("name", name)?;
        }
        if let Some(department) = input.department {
            user.department = bounded("department", department)?;
        }

        let user = self.user_repository.update(&user).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::UserUpdated,
                resource_type: "user".to_owned(),
                resource_id: user.id.to_string(),
                detail: Some(format!(
                    "name='{}' role={} department='{}'",
                    user.name,
                    user.role.as_str(),
                    user.department
                )),
            })
            .await?;

        Ok(user)
    }

    /// Deactivates a user. Admins cannot deactivate themselves.
    pub async fn deactivate_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<UserRecord> {
        let admin = self
            .authorization_service
            .require_permission(actor, Permission::UserManage)
            .await?;
        if admin.id == user_id {
            return Err(AppError::Forbidden(
                "you cannot deactivate your own account".to_owned(),
            ));
        }

        let mut user = self.find_existing(user_id).await?;
        require_super_admin_for(&admin, user.role)?;
        if !user.is_active {
            return Ok(user);
        }

        user.is_active = false;
        let user = self.user_repository.update(&user).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::UserDeactivated,
                resource_type: "user".to_owned(),
                resource_id: user.id.to_string(),
                detail: None,
            })
            .await?;

        Ok(user)
    }

    /// Lists users in the directory.
    pub async fn list_users(
        &self,
        actor: &UserIdentity,
        query: UserQuery,
    ) -> AppResult<Page<UserRecord>> {
        self.authorization_service
            .require_permission(actor, Permission::UserManage)
            .await?;

        self.user_repository.list(query).await
    }

    /// Returns one user.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserRecord> {
        self.authorization_service
            .require_permission(actor, Permission::UserManage)
            .await?;

        self.find_existing(user_id).await
    }

    /// Returns the record of the signed-in user.
    pub async fn current_user(&self, actor: &UserIdentity) -> AppResult<UserRecord> {
        self.authorization_service.resolve_actor(actor).await
    }

    async fn find_existing(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    fn validated_new_user(
        &self,
        name: String,
        email: String,
        role: Role,
        department: String,
        password: &str,
    ) -> AppResult<NewUserRecord> {
        let name = bounded("name", name)?;
        let department = bounded("department", department)?;
        let email = EmailAddress::new(email)?;
        validate_password(password)?;
        let password_hash = self.password_hasher.hash_password(password)?;

        Ok(NewUserRecord {
            name,
            email: email.as_str().to_owned(),
            role,
            department,
            password_hash,
        })
    }
}

fn bounded(field: &str, value: String) -> AppResult<String> {
    NonEmptyString::with_max_chars(field, value, USER_NAME_MAX_CHARS).map(String::from)
}

fn require_super_admin_for(admin: &UserRecord, role: Role) -> AppResult<()> {
    if role == Role::SuperAdmin && admin.role != Role::SuperAdmin {
        return Err(AppError::Forbidden(
            "only a super admin can manage super admin accounts".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests;
