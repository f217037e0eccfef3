//! Role management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use warden_entity::role::RoleWithPermissions;

use crate::dto::request::{CreateRoleRequest, UpdateRoleRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/v1/roles
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoleWithPermissions>>>, ApiError> {
    let roles = state.role_service.list().await?;
    Ok(Json(ApiResponse::ok(roles)))
}

/// GET /api/v1/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RoleWithPermissions>>, ApiError> {
    let id = parse_uuid(&id)?;
    let role = state.role_service.get(id).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// POST /api/v1/roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoleWithPermissions>>), ApiError> {
    let role = state.role_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(role))))
}

/// PUT /api/v1/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<RoleWithPermissions>>, ApiError> {
    let id = parse_uuid(&id)?;
    let role = state.role_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// DELETE /api/v1/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_uuid(&id)?;
    state.role_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("role deleted"))))
}
