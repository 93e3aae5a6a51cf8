use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// One entry of a request's approval history.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/approval-record-response.ts"
)]
pub struct ApprovalRecordResponse {
    pub actor_id: String,
    pub actor_role: String,
    pub action: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub stage: Option<String>,
    pub comment: Option<String>,
    pub acted_at: String,
}

/// API representation of a leave request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/leave-request-response.ts"
)]
pub struct LeaveRequestResponse {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub department: String,
    pub leave_type: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: String,
    pub working_days: u16,
    pub reason: String,
    pub status: String,
    pub current_stage: Option<String>,
    pub approvals: Vec<ApprovalRecordResponse>,
    pub created_at: String,
    pub updated_at: String,
}

/// One page of leave requests.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/leave-page-response.ts"
)]
pub struct LeavePageResponse {
    pub items: Vec<LeaveRequestResponse>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Incoming payload for submitting or resubmitting a request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-leave-request.ts"
)]
pub struct SubmitLeaveRequest {
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

/// Optional reviewer comment. Reject and return require one.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/review-action-request.ts"
)]
pub struct ReviewActionRequest {
    pub comment: Option<String>,
}

/// Incoming payload for one review action over many requests.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-action-request.ts"
)]
pub struct BulkActionRequest {
    pub ids: Vec<String>,
    pub action: String,
    pub comment: Option<String>,
}

/// A request the bulk action could not be applied to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-failure-response.ts"
)]
pub struct BulkFailureResponse {
    pub id: String,
    pub message: String,
}

/// Per-item results of a bulk action.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-action-response.ts"
)]
pub struct BulkActionResponse {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailureResponse>,
}

/// Balance of one leave type for one year.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/leave-balance-response.ts"
)]
pub struct LeaveBalanceResponse {
    pub leave_type: String,
    pub entitled: u32,
    pub carried: u32,
    pub used: u32,
    pub pending: u32,
    pub remaining: i64,
    pub enforced: bool,
}
