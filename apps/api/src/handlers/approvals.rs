use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Query, State};
use leavedesk_application::BulkActionInput;
use leavedesk_core::UserIdentity;
use leavedesk_domain::{ApprovalAction, LeaveRequestId};

use crate::dto::{BulkActionRequest, BulkActionResponse, LeavePageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::PageParams;

/// GET /api/approvals - Requests waiting for the caller's decision, oldest first.
pub async fn approval_queue_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<LeavePageResponse>> {
    let (limit, offset) = page.window()?;
    let queue = state
        .leave_service
        .approval_queue(&user, limit, offset)
        .await?;

    Ok(Json(LeavePageResponse::from(queue)))
}

/// POST /api/approvals/bulk - One review action over many requests.
///
/// Malformed ids fail the whole call; per-request failures are reported in the body.
pub async fn bulk_action_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<BulkActionRequest>,
) -> ApiResult<Json<BulkActionResponse>> {
    let ids = payload
        .ids
        .iter()
        .map(|id| LeaveRequestId::from_str(id))
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = state
        .leave_service
        .bulk_act(
            &user,
            BulkActionInput {
                ids,
                action: ApprovalAction::from_str(payload.action.trim())?,
                comment: payload.comment,
            },
        )
        .await?;

    Ok(Json(BulkActionResponse::from(outcome)))
}
