//! Per-address failed login counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Failed login attempts recorded for one source address.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FailedLoginRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Source address; one record per address.
    pub ip_address: String,
    /// Last attempted username.
    pub username: String,
    /// Last seen User-Agent.
    pub user_agent: Option<String>,
    /// Attempts counted so far.
    pub attempts: i32,
    /// Most recent failure.
    pub last_attempt_at: DateTime<Utc>,
    /// First failure.
    pub created_at: DateTime<Utc>,
}

/// One failed login, as observed by the guard.
#[derive(Debug, Clone)]
pub struct FailedLoginAttempt {
    /// Source address.
    pub ip_address: String,
    /// Attempted username or email.
    pub username: String,
    /// User-Agent header.
    pub user_agent: Option<String>,
}
