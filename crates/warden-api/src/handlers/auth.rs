//! Authentication handlers: register, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use warden_auth::session::TokenPair;
use warden_entity::user::Principal;
use warden_service::AuthSession;

use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LogoutAllResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, Client, ValidatedJson};
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), ApiError> {
    let session = state.auth_service.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, ApiError> {
    let session = state.auth_service.login(req.into(), &client).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let tokens = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<ApiResponse<Principal>> {
    Json(ApiResponse::ok(state.auth_service.me(&auth)))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service.logout(&auth, &req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("logged out"))))
}

/// POST /api/v1/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<LogoutAllResponse>>, ApiError> {
    let revoked = state.auth_service.logout_all(&auth).await?;
    Ok(Json(ApiResponse::ok(LogoutAllResponse { revoked })))
}
