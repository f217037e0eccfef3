//! Security guard: response header hardening, IP allow-list, request size.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use warden_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::Client;
use crate::state::AppState;

/// Headers attached to every response.
pub const SECURITY_HEADERS: [(&str, &str); 7] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("content-security-policy", "default-src 'self'"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
];

/// Adds the hardening headers to the response, whatever its status.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

/// Rejects clients outside a non-empty allow-list with 403.
pub async fn ip_allowlist(
    State(state): State<AppState>,
    Client(client): Client,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let allowed = &state.config.security.allowed_ips;
    if !allowed.is_empty() && !allowed.iter().any(|ip| ip == &client.ip_address) {
        warn!(ip = %client.ip_address, "Request from address outside allow-list");
        return Err(AppError::authorization("access denied from this address").into());
    }
    Ok(next.run(request).await)
}

/// Rejects requests whose declared `Content-Length` exceeds the ceiling with 413.
///
/// Bodies without a declared length are capped by the router's body limit layer.
pub async fn request_size_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let max = state.config.security.max_request_bytes;
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if declared.is_some_and(|len| len > max) {
        return Err(AppError::payload_too_large("request too large").into());
    }
    Ok(next.run(request).await)
}
