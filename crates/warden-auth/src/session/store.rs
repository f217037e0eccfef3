//! Refresh token persistence over the [`RefreshTokenStore`].
//!
//! Tokens are 32 random bytes, hex encoded. Only their SHA-256 digest is
//! written to storage, so a leaked table does not yield usable tokens.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use warden_core::config::{AuthConfig, REFRESH_TTL_DAYS};
use warden_core::error::AppError;
use warden_database::store::RefreshTokenStore;
use warden_entity::token::{CreateRefreshToken, RefreshToken};

/// Random bytes per refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

/// A freshly issued refresh token. The raw value exists only here.
#[derive(Clone)]
pub struct IssuedRefreshToken {
    /// Opaque token handed to the client.
    pub token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedRefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedRefreshToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Generates a new opaque refresh token with 256 bits of entropy.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 digest of a refresh token, hex encoded.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Refresh token operations with a fixed lifetime.
#[derive(Clone)]
pub struct SessionStore {
    tokens: Arc<dyn RefreshTokenStore>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a session store using the configured refresh token lifetime.
    pub fn new(tokens: Arc<dyn RefreshTokenStore>, config: &AuthConfig) -> Self {
        Self {
            tokens,
            ttl: Duration::days(config.refresh_token_ttl_days.min(*REFRESH_TTL_DAYS.end()) as i64),
        }
    }

    /// Refresh token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generates and persists an active refresh token for `user_id`.
    pub async fn issue(&self, user_id: Uuid) -> Result<IssuedRefreshToken, AppError> {
        let token = generate_refresh_token();
        let expires_at = Utc::now() + self.ttl;

        self.tokens
            .create(CreateRefreshToken {
                user_id,
                token_hash: hash_refresh_token(&token),
                expires_at,
            })
            .await?;

        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// The stored record if the token is active and unexpired.
    pub async fn find_valid(&self, token: &str) -> Result<Option<RefreshToken>, AppError> {
        self.tokens
            .find_active(&hash_refresh_token(token), Utc::now())
            .await
    }

    /// Deactivates one token. Returns whether it was active before the call.
    pub async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        let changed = self.tokens.deactivate(&hash_refresh_token(token)).await?;
        Ok(changed > 0)
    }

    /// Deactivates every token of a user. Returns how many were active.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        let changed = self.tokens.deactivate_all_for_user(user_id).await?;
        if changed > 0 {
            info!(user_id = %user_id, revoked = changed, "Revoked refresh tokens");
        }
        Ok(changed)
    }

    /// Deletes tokens that are expired or inactive.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.tokens.purge(Utc::now()).await
    }
}
