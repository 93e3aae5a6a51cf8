use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use leavedesk_application::{CreateUserInput, UpdateUserInput, UserQuery};
use leavedesk_core::UserIdentity;
use leavedesk_domain::{Role, UserId};
use serde::Deserialize;

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserPageResponse, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{non_blank, page_window};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<UserPageResponse>> {
    let (limit, offset) = page_window(query.limit, query.offset)?;
    let role = non_blank(query.role)
        .map(|role| Role::from_str(&role))
        .transpose()?;

    let page = state
        .user_service
        .list_users(
            &user,
            UserQuery {
                search: non_blank(query.search),
                role,
                department: non_blank(query.department),
                include_inactive: query.include_inactive,
                limit,
                offset,
            },
        )
        .await?;

    Ok(Json(UserPageResponse::from(page)))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let created = state
        .user_service
        .create_user(
            &user,
            CreateUserInput {
                name: payload.name,
                email: payload.email,
                role: Role::from_str(payload.role.trim())?,
                department: payload.department,
                password: payload.password,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let found = state
        .user_service
        .get_user(&user, UserId::from_str(&user_id)?)
        .await?;

    Ok(Json(UserResponse::from(found)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let role = payload
        .role
        .as_deref()
        .map(|role| Role::from_str(role.trim()))
        .transpose()?;

    let updated = state
        .user_service
        .update_user(
            &user,
            UserId::from_str(&user_id)?,
            UpdateUserInput {
                name: payload.name,
                role,
                department: payload.department,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

pub async fn deactivate_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let deactivated = state
        .user_service
        .deactivate_user(&user, UserId::from_str(&user_id)?)
        .await?;

    Ok(Json(UserResponse::from(deactivated)))
}
