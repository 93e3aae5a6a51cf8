use leavedesk_application::UserRecord;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::UserResponse;

/// Incoming payload for creating the first super admin.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub token: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub password: String,
}

/// Incoming payload for email and password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Incoming payload for changing the signed-in user's password.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-password-request.ts"
)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// The signed-in user and what they may do.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/me-response.ts"
)]
pub struct MeResponse {
    pub user: UserResponse,
    /// Stable permission names such as `leave.submit`.
    pub permissions: Vec<String>,
}

impl From<UserRecord> for MeResponse {
    fn from(user: UserRecord) -> Self {
        let permissions = user
            .role
            .permissions()
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .collect();

        Self {
            user: UserResponse::from(user),
            permissions,
        }
    }
}
