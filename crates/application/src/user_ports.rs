use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leavedesk_core::AppResult;
use leavedesk_domain::{ActingUser, Role, UserId};

/// Maximum length of a user name or department name.
pub const USER_NAME_MAX_CHARS: usize = 120;

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Canonical lower-cased email address.
    pub email: String,
    /// Organisational role.
    pub role: Role,
    /// Department the user belongs to.
    pub department: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Deactivated users cannot sign in or act.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Returns the state-machine view of this user.
    #[must_use]
    pub fn acting_user(&self) -> ActingUser {
        ActingUser {
            user_id: self.id,
            role: self.role,
            department: self.department.clone(),
        }
    }
}

/// Validated payload for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Display name.
    pub name: String,
    /// Canonical email address.
    pub email: String,
    /// Organisational role.
    pub role: Role,
    /// Department.
    pub department: String,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Filters for the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserQuery {
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
    /// Exact role filter.
    pub role: Option<Role>,
    /// Case-insensitive department filter.
    pub department: Option<String>,
    /// Includes deactivated users when set.
    pub include_inactive: bool,
    /// Maximum rows returned.
    pub limit: usize,
    /// Rows skipped.
    pub offset: usize,
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total matching rows.
    pub total: u64,
    /// Requested page size.
    pub limit: usize,
    /// Requested offset.
    pub offset: usize,
}

impl<T> Page<T> {
    /// Returns an empty page for the given window.
    #[must_use]
    pub fn empty(limit: usize, offset: usize) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit,
            offset,
        }
    }
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by id.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Inserts a user. Duplicate emails are a conflict.
    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord>;

    /// Replaces name, role, department and activity flag.
    async fn update(&self, user: &UserRecord) -> AppResult<UserRecord>;

    /// Replaces the password hash.
    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()>;

    /// Lists users matching the query, ordered by name.
    async fn list(&self, query: UserQuery) -> AppResult<Page<UserRecord>>;

    /// Counts all users, active or not.
    async fn count(&self) -> AppResult<u64>;

    /// Returns whether the department has an active department head.
    async fn has_active_department_head(&self, department: &str) -> AppResult<bool>;
}

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
