//! Permission catalogue handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use warden_entity::permission::Permission;

use crate::dto::request::{CreatePermissionRequest, UpdatePermissionRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/v1/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    let permissions = state.permission_service.list().await?;
    Ok(Json(ApiResponse::ok(permissions)))
}

/// GET /api/v1/permissions/{id}
pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Permission>>, ApiError> {
    let id = parse_uuid(&id)?;
    let permission = state.permission_service.get(id).await?;
    Ok(Json(ApiResponse::ok(permission)))
}

/// POST /api/v1/permissions
pub async fn create_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Permission>>), ApiError> {
    let permission = state.permission_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(permission))))
}

/// PUT /api/v1/permissions/{id}
pub async fn update_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdatePermissionRequest>,
) -> Result<Json<ApiResponse<Permission>>, ApiError> {
    let id = parse_uuid(&id)?;
    let permission = state
        .permission_service
        .update(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(permission)))
}

/// DELETE /api/v1/permissions/{id}
pub async fn delete_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_uuid(&id)?;
    state.permission_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("permission deleted"))))
}
