//! Per-route authorization stage of the pipeline.

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use tracing::debug;

use warden_auth::rbac::Requirement;
use warden_core::error::AppError;
use warden_service::context::RequestContext;

use crate::error::ApiError;
use crate::middleware::auth::NO_TOKEN_PROVIDED;
use crate::state::AppState;

/// Rejects with 403 unless the authenticated principal meets `requirement`.
///
/// Must run after `require_auth`; without a context the request is treated
/// as unauthenticated.
pub async fn enforce(
    State(requirement): State<Requirement>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .ok_or_else(|| AppError::authentication(NO_TOKEN_PROVIDED))?;

    if let Err(e) = requirement.check(&ctx.principal) {
        debug!(user_id = %ctx.user_id(), %requirement, "Authorization denied");
        return Err(e.into());
    }

    Ok(next.run(request).await)
}

/// Wraps a method router with a requirement check.
pub fn guarded(route: MethodRouter<AppState>, requirement: Requirement) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(requirement, enforce))
}
