//! Persisted refresh token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A refresh token row. Only the SHA-256 digest of the token is stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Unique record identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Hex-encoded SHA-256 of the opaque token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Cleared on logout, logout-all, rotation, or account disable.
    pub is_active: bool,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Active and not yet expired at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > now
    }

    /// Eligible for garbage collection at `now`.
    pub fn is_purgeable(&self, now: DateTime<Utc>) -> bool {
        !self.is_active || self.expires_at <= now
    }
}

/// Data required to persist a newly issued refresh token.
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    /// Owning user.
    pub user_id: Uuid,
    /// Hex-encoded SHA-256 of the opaque token.
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
