use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use leavedesk_application::{LeaveQuery, SubmitLeaveInput};
use leavedesk_core::{AppError, UserIdentity};
use leavedesk_domain::{ApprovalAction, LeaveRequestId, LeaveStatus, LeaveType, UserId};
use serde::Deserialize;

use crate::dto::{
    LeaveBalanceResponse, LeavePageResponse, LeaveRequestResponse, ReviewActionRequest,
    SubmitLeaveRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{non_blank, page_window, parse_date};

#[derive(Debug, Deserialize)]
pub struct MyLeavesQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AllLeavesQuery {
    pub requester_id: Option<String>,
    pub status: Option<String>,
    pub leave_type: Option<String>,
    pub department: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

pub async fn submit_leave_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SubmitLeaveRequest>,
) -> ApiResult<(StatusCode, Json<LeaveRequestResponse>)> {
    let request = state
        .leave_service
        .submit(&user, submit_input(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(LeaveRequestResponse::from(request))))
}

pub async fn resubmit_leave_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<SubmitLeaveRequest>,
) -> ApiResult<Json<LeaveRequestResponse>> {
    let request = state
        .leave_service
        .resubmit(&user, LeaveRequestId::from_str(&id)?, submit_input(payload)?)
        .await?;

    Ok(Json(LeaveRequestResponse::from(request)))
}

pub async fn list_my_leaves_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<MyLeavesQuery>,
) -> ApiResult<Json<LeavePageResponse>> {
    let (limit, offset) = page_window(query.limit, query.offset)?;
    let status = parse_optional::<LeaveStatus>(query.status)?;

    let page = state
        .leave_service
        .list_mine(&user, status, limit, offset)
        .await?;

    Ok(Json(LeavePageResponse::from(page)))
}

pub async fn list_all_leaves_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AllLeavesQuery>,
) -> ApiResult<Json<LeavePageResponse>> {
    let (limit, offset) = page_window(query.limit, query.offset)?;
    let starts_from = non_blank(query.from)
        .map(|value| parse_date("from", &value))
        .transpose()?;
    let starts_until = non_blank(query.to)
        .map(|value| parse_date("to", &value))
        .transpose()?;

    let page = state
        .leave_service
        .list_all(
            &user,
            LeaveQuery {
                requester_id: parse_optional::<UserId>(query.requester_id)?,
                status: parse_optional::<LeaveStatus>(query.status)?,
                leave_type: parse_optional::<LeaveType>(query.leave_type)?,
                department: non_blank(query.department),
                starts_from,
                starts_until,
                limit,
                offset,
            },
        )
        .await?;

    Ok(Json(LeavePageResponse::from(page)))
}

pub async fn get_leave_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<LeaveRequestResponse>> {
    let request = state
        .leave_service
        .get(&user, LeaveRequestId::from_str(&id)?)
        .await?;

    Ok(Json(LeaveRequestResponse::from(request)))
}

/// POST /api/leaves/{id}/{action} - Forward, approve, reject, return or cancel.
pub async fn leave_action_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((id, action)): Path<(String, String)>,
    payload: Option<Json<ReviewActionRequest>>,
) -> ApiResult<Json<LeaveRequestResponse>> {
    let action = ApprovalAction::from_str(&action)?;
    if !action.is_review() && action != ApprovalAction::Cancel {
        return Err(AppError::Validation(format!(
            "'{}' is not available on this endpoint",
            action.as_str()
        ))
        .into());
    }
    let comment = payload.and_then(|Json(body)| body.comment);

    let request = state
        .leave_service
        .act(
            &user,
            LeaveRequestId::from_str(&id)?,
            action,
            comment,
        )
        .await?;

    Ok(Json(LeaveRequestResponse::from(request)))
}

pub async fn balances_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<Vec<LeaveBalanceResponse>>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let balances = state
        .leave_service
        .balances(&user, year)
        .await?
        .into_iter()
        .map(LeaveBalanceResponse::from)
        .collect();

    Ok(Json(balances))
}

fn submit_input(payload: SubmitLeaveRequest) -> Result<SubmitLeaveInput, AppError> {
    Ok(SubmitLeaveInput {
        leave_type: LeaveType::from_str(payload.leave_type.trim())?,
        start_date: parse_date("start_date", &payload.start_date)?,
        end_date: parse_date("end_date", &payload.end_date)?,
        reason: payload.reason,
    })
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = AppError>,
{
    non_blank(value).map(|value| T::from_str(&value)).transpose()
}
