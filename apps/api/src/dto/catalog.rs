use leavedesk_domain::{Holiday, PolicyConfig};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of one leave type's policy.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/policy-response.ts"
)]
pub struct PolicyResponse {
    pub leave_type: String,
    pub max_days: u16,
    pub min_days: u16,
    pub notice_days: u16,
    pub carry_limit: u16,
}

/// Incoming payload for policy updates. The leave type comes from the path.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-policy-request.ts"
)]
pub struct SavePolicyRequest {
    pub max_days: u16,
    pub min_days: u16,
    pub notice_days: u16,
    pub carry_limit: u16,
}

/// API representation of a public holiday.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/holiday-response.ts"
)]
pub struct HolidayResponse {
    pub date: String,
    pub name: String,
}

/// Incoming payload for adding a holiday.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-holiday-request.ts"
)]
pub struct CreateHolidayRequest {
    pub date: String,
    pub name: String,
}

impl From<PolicyConfig> for PolicyResponse {
    fn from(policy: PolicyConfig) -> Self {
        Self {
            leave_type: policy.leave_type().as_str().to_owned(),
            max_days: policy.max_days(),
            min_days: policy.min_days(),
            notice_days: policy.notice_days(),
            carry_limit: policy.carry_limit(),
        }
    }
}

impl From<Holiday> for HolidayResponse {
    fn from(holiday: Holiday) -> Self {
        Self {
            date: holiday.date().to_string(),
            name: holiday.name().to_string(),
        }
    }
}
