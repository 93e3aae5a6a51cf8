use leavedesk_application::{Page, UserRecord};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a directory user. The password hash never leaves the server.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One page of directory users.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-page-response.ts"
)]
pub struct UserPageResponse {
    pub items: Vec<UserResponse>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub password: String,
}

/// Incoming payload for partial user updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_owned(),
            department: user.department,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

impl From<Page<UserRecord>> for UserPageResponse {
    fn from(page: Page<UserRecord>) -> Self {
        Self {
            items: page.items.into_iter().map(UserResponse::from).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}
