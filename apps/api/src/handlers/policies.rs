use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use leavedesk_core::UserIdentity;
use leavedesk_domain::{LeaveType, PolicyConfigInput};

use crate::dto::{PolicyResponse, SavePolicyRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_policies_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PolicyResponse>>> {
    let policies = state
        .policy_service
        .list_policies(&user)
        .await?
        .into_iter()
        .map(PolicyResponse::from)
        .collect();

    Ok(Json(policies))
}

pub async fn get_policy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(leave_type): Path<String>,
) -> ApiResult<Json<PolicyResponse>> {
    let policy = state
        .policy_service
        .get_policy(&user, LeaveType::from_str(&leave_type)?)
        .await?;

    Ok(Json(PolicyResponse::from(policy)))
}

pub async fn save_policy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(leave_type): Path<String>,
    Json(payload): Json<SavePolicyRequest>,
) -> ApiResult<Json<PolicyResponse>> {
    let policy = state
        .policy_service
        .save_policy(
            &user,
            PolicyConfigInput {
                leave_type: LeaveType::from_str(&leave_type)?,
                max_days: payload.max_days,
                min_days: payload.min_days,
                notice_days: payload.notice_days,
                carry_limit: payload.carry_limit,
            },
        )
        .await?;

    Ok(Json(PolicyResponse::from(policy)))
}
