use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use leavedesk_application::{NewUserRecord, Page, UserQuery, UserRecord, UserRepository};
use leavedesk_core::{AppError, AppResult};
use leavedesk_domain::{Role, UserId, same_department};

use super::paginate;

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserRepository {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let email = email.trim();

        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|stored| stored.email.to_lowercase() == user.email.to_lowercase())
        {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                user.email
            )));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            password_hash: user.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.push(record.clone());

        Ok(record)
    }

    async fn update(&self, user: &UserRecord) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|stored| stored.id == user.id)
            .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", user.id)))?;

        stored.name = user.name.clone();
        stored.role = user.role;
        stored.department = user.department.clone();
        stored.is_active = user.is_active;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|stored| stored.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))?;

        stored.password_hash = password_hash.to_owned();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self, query: UserQuery) -> AppResult<Page<UserRecord>> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);
        let department = query
            .department
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let mut users: Vec<UserRecord> = self
            .users
            .read()
            .await
            .iter()
            .filter(|user| query.include_inactive || user.is_active)
            .filter(|user| query.role.is_none_or(|role| user.role == role))
            .filter(|user| department.is_none_or(|value| same_department(&user.department, value)))
            .filter(|user| {
                search.as_deref().is_none_or(|value| {
                    user.name.to_lowercase().contains(value)
                        || user.email.to_lowercase().contains(value)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|left, right| {
            left.name
                .to_lowercase()
                .cmp(&right.name.to_lowercase())
                .then(left.id.cmp(&right.id))
        });

        Ok(paginate(users, query.limit, query.offset))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn has_active_department_head(&self, department: &str) -> AppResult<bool> {
        Ok(self.users.read().await.iter().any(|user| {
            user.is_active
                && user.role == Role::DepartmentHead
                && same_department(&user.department, department)
        }))
    }
}
