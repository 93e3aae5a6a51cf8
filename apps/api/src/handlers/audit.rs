use axum::Json;
use axum::extract::{Extension, Query, State};
use leavedesk_application::AuditLogQuery;
use leavedesk_core::UserIdentity;
use serde::Deserialize;

use crate::dto::AuditLogEntryResponse;
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_AUDIT_PAGE: usize = 50;

/// `?limit=&offset=&action=&subject=`; the limit is range-checked by the service.
#[derive(Debug, Deserialize)]
pub struct AuditFilterParams {
    limit: Option<usize>,
    offset: Option<usize>,
    action: Option<String>,
    subject: Option<String>,
}

impl From<AuditFilterParams> for AuditLogQuery {
    fn from(params: AuditFilterParams) -> Self {
        Self {
            limit: params.limit.unwrap_or(DEFAULT_AUDIT_PAGE),
            offset: params.offset.unwrap_or_default(),
            action: params.action,
            subject: params.subject,
        }
    }
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(params): Query<AuditFilterParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .audit_log_service
        .list_audit_log(&user, params.into())
        .await?;

    Ok(Json(
        entries.into_iter().map(AuditLogEntryResponse::from).collect(),
    ))
}
