//! Authentication stage of the authorization pipeline.

use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, Uri, header};
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_service::context::RequestContext;

use crate::error::ApiError;
use crate::extractors::Client;
use crate::state::AppState;

/// Message when neither an Authorization header nor a `token` parameter is present.
pub const NO_TOKEN_PROVIDED: &str = "no token provided";

/// Marker placed on responses of authenticated requests for the audit log.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Takes the bearer token from `Authorization: Bearer <token>`, falling back
/// to the `token` query parameter.
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(uri)
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|t| !t.is_empty())
    })
}

/// Authenticates the request and attaches its [`RequestContext`].
///
/// Rejections are all 401: missing token, invalid or expired token,
/// unknown user, disabled account.
pub async fn require_auth(
    State(state): State<AppState>,
    Client(client): Client,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), request.uri())
        .ok_or_else(|| AppError::authentication(NO_TOKEN_PROVIDED))?;

    let principal = state.auth_service.authenticate(&token).await?;
    let user_id = principal.id();

    request
        .extensions_mut()
        .insert(RequestContext::new(principal, client));

    let mut response = next.run(request).await;
    response
        .extensions_mut()
        .insert(AuthenticatedUser(user_id));
    Ok(response)
}
