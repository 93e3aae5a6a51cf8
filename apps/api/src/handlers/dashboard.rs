use axum::Json;
use axum::extract::{Extension, State};
use leavedesk_core::UserIdentity;

use crate::dto::DashboardResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<DashboardResponse>> {
    let summary = state.leave_service.dashboard(&user).await?;
    Ok(Json(DashboardResponse::from(summary)))
}
