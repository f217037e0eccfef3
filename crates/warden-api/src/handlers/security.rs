//! Security telemetry for administrators.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use warden_core::types::PageResponse;
use warden_entity::security::{FailedLoginRecord, RequestLog};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::PaginationParams;
use crate::state::AppState;

/// Query for the request log tail.
#[derive(Debug, Deserialize)]
pub struct RecentLogsQuery {
    /// Number of entries (default 100, max 500).
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    100
}

/// GET /api/v1/security/failed-logins
pub async fn failed_logins(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<FailedLoginRecord>>>, ApiError> {
    let page = state
        .security_service
        .failed_logins(params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v1/security/request-logs
pub async fn request_logs(
    State(state): State<AppState>,
    Query(query): Query<RecentLogsQuery>,
) -> Result<Json<ApiResponse<Vec<RequestLog>>>, ApiError> {
    let logs = state.security_service.recent_requests(query.limit).await?;
    Ok(Json(ApiResponse::ok(logs)))
}
