//! Request logging and the asynchronous request audit log.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

use warden_database::store::RequestLogStore;
use warden_entity::security::CreateRequestLog;

use crate::extractors::Client;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;

/// Logs method, path, status, and duration, then appends an audit entry
/// on a detached task. Audit failures are logged and dropped.
pub async fn request_logging(
    State(state): State<AppState>,
    Client(client): Client,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis() as i64;
    let status = response.status();
    let user_id = response
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|AuthenticatedUser(id)| *id);

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms,
        ip = %client.ip_address,
        "HTTP request"
    );

    let entry = CreateRequestLog {
        user_id,
        ip_address: client.ip_address,
        method: method.to_string(),
        path,
        user_agent,
        status_code: i32::from(status.as_u16()),
        duration_ms,
    };
    let logs = state.stores.request_logs.clone();
    tokio::spawn(async move {
        if let Err(e) = logs.append(entry).await {
            warn!(error = %e, "Failed to write request log");
        }
    });

    response
}
