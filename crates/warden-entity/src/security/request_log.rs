//! Request audit log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One handled request, or a security event recorded in the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequestLog {
    /// Unique entry identifier.
    pub id: Uuid,
    /// Authenticated user, if any.
    pub user_id: Option<Uuid>,
    /// Client address.
    pub ip_address: String,
    /// HTTP method, or `SECURITY` for guard events.
    pub method: String,
    /// Request path.
    pub path: String,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Response status.
    pub status_code: i32,
    /// Handling time in milliseconds.
    pub duration_ms: i64,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a request log entry.
#[derive(Debug, Clone)]
pub struct CreateRequestLog {
    /// Authenticated user, if any.
    pub user_id: Option<Uuid>,
    /// Client address.
    pub ip_address: String,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Response status.
    pub status_code: i32,
    /// Handling time in milliseconds.
    pub duration_ms: i64,
}
