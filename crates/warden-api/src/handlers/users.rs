//! User administration handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use serde::Deserialize;

use warden_core::types::PageResponse;
use warden_entity::user::{Principal, User, UserFilter};

use crate::dto::request::{AssignRolesRequest, CreateUserRequest, UpdateUserRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// Filters accepted by the user listing.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    /// `true` or `false` to restrict by status.
    pub active: Option<bool>,
    /// Case-insensitive match on username or email.
    pub search: Option<String>,
}

impl From<UserListQuery> for UserFilter {
    fn from(query: UserListQuery) -> Self {
        Self {
            active: query.active,
            search: query.search,
        }
    }
}

/// GET /api/v1/users?active=&search=
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<PageResponse<User>>>, ApiError> {
    let filter = UserFilter::from(query);
    let page = state
        .user_service
        .list(&filter, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let id = parse_uuid(&id)?;
    let principal = state.user_service.get(id).await?;
    Ok(Json(ApiResponse::ok(principal)))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Principal>>), ApiError> {
    let principal = state.user_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(principal))))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = parse_uuid(&id)?;
    let user = state.user_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_uuid(&id)?;
    state.user_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("user deleted"))))
}

/// POST /api/v1/users/{id}/roles
///
/// Replaces the user's role set.
pub async fn assign_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AssignRolesRequest>,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let id = parse_uuid(&id)?;
    let principal = state.user_service.replace_roles(&auth, id, req.role_ids).await?;
    Ok(Json(ApiResponse::ok(principal)))
}
