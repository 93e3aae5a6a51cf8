use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use leavedesk_core::UserIdentity;

use crate::dto::{CreateHolidayRequest, HolidayResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::leaves::YearQuery;
use super::parse_date;

pub async fn list_holidays_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<Vec<HolidayResponse>>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let holidays = state
        .holiday_service
        .list_holidays(&user, year)
        .await?
        .into_iter()
        .map(HolidayResponse::from)
        .collect();

    Ok(Json(holidays))
}

pub async fn create_holiday_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateHolidayRequest>,
) -> ApiResult<(StatusCode, Json<HolidayResponse>)> {
    let holiday = state
        .holiday_service
        .create_holiday(&user, parse_date("date", &payload.date)?, payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(HolidayResponse::from(holiday))))
}

pub async fn delete_holiday_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(date): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .holiday_service
        .delete_holiday(&user, parse_date("date", &date)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
