mod audit;
mod auth;
mod catalog;
mod common;
mod dashboard;
mod leaves;
mod users;

pub use audit::AuditLogEntryResponse;
pub use auth::{BootstrapRequest, ChangePasswordRequest, LoginRequest, MeResponse};
pub use catalog::{CreateHolidayRequest, HolidayResponse, PolicyResponse, SavePolicyRequest};
pub use common::{HealthDependencyStatus, HealthResponse};
pub use dashboard::DashboardResponse;
pub use leaves::{
    BulkActionRequest, BulkActionResponse, LeaveBalanceResponse, LeavePageResponse,
    LeaveRequestResponse, ReviewActionRequest, SubmitLeaveRequest,
};
pub use users::{CreateUserRequest, UpdateUserRequest, UserPageResponse, UserResponse};
