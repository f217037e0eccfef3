//! Token issuance, validation, refresh, and revocation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use warden_core::config::{AuthConfig, RefreshRotation};
use warden_core::error::AppError;
use warden_database::store::UserStore;
use warden_entity::token::RefreshToken;
use warden_entity::user::User;

use super::store::{IssuedRefreshToken, SessionStore};
use crate::jwt::{Claims, JwtDecoder, JwtEncoder};

/// Message returned for every refresh token that cannot be used.
pub const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";

/// An access token plus refresh token, as returned to clients.
#[derive(Clone, Serialize)]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish_non_exhaustive()
    }
}

/// Coordinates the access token codec with refresh token storage.
#[derive(Clone)]
pub struct SessionManager {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    store: SessionStore,
    users: Arc<dyn UserStore>,
    rotation: RefreshRotation,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("encoder", &self.encoder)
            .field("store", &self.store)
            .field("rotation", &self.rotation)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a session manager from auth configuration.
    pub fn new(
        config: &AuthConfig,
        store: SessionStore,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            store,
            users,
            rotation: config.refresh_rotation,
        }
    }

    /// Active refresh rotation policy.
    pub fn rotation(&self) -> RefreshRotation {
        self.rotation
    }

    /// Refresh token storage.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Signs an access token for `user`.
    pub fn issue_access_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        self.encoder.issue_access_token(user)
    }

    /// Generates and persists a refresh token for `user_id`.
    pub async fn issue_refresh_token(&self, user_id: Uuid) -> Result<IssuedRefreshToken, AppError> {
        self.store.issue(user_id).await
    }

    /// Issues an access token and a refresh token for `user`.
    pub async fn issue_token_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        let (access_token, access_expires_at) = self.issue_access_token(user)?;
        let refresh = self.issue_refresh_token(user.id).await?;

        debug!(user_id = %user.id, "Issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            access_expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Verifies an access token's signature, algorithm, and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decoder.verify_access_token(token)
    }

    /// Resolves a refresh token to its record and owning user.
    ///
    /// Unknown, inactive, and expired tokens, as well as tokens whose owner
    /// is missing or disabled, all fail with the same error.
    pub async fn verify_refresh_token(
        &self,
        token: &str,
    ) -> Result<(RefreshToken, User), AppError> {
        let Some(record) = self.store.find_valid(token).await? else {
            debug!("Refresh rejected: token not active");
            return Err(AppError::authentication(INVALID_REFRESH_TOKEN));
        };

        match self.users.find_by_id(record.user_id).await? {
            Some(user) if user.is_active => Ok((record, user)),
            _ => {
                debug!(user_id = %record.user_id, "Refresh rejected: owner missing or disabled");
                Err(AppError::authentication(INVALID_REFRESH_TOKEN))
            }
        }
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Under [`RefreshRotation::Rotate`] the presented token is revoked and a
    /// new one returned; under [`RefreshRotation::Reuse`] the same token comes
    /// back with its original expiry.
    pub async fn refresh(&self, token: &str) -> Result<TokenPair, AppError> {
        let (record, user) = self.verify_refresh_token(token).await?;
        let (access_token, access_expires_at) = self.issue_access_token(&user)?;

        let (refresh_token, refresh_expires_at) = match self.rotation {
            RefreshRotation::Reuse => (token.to_string(), record.expires_at),
            RefreshRotation::Rotate => {
                // The replacement is persisted before the presented token is
                // spent, so a failed write leaves the caller's session intact.
                let next = self.issue_refresh_token(user.id).await?;
                // A concurrent refresh may have consumed the token first.
                if !self.store.revoke(token).await? {
                    self.store.revoke(&next.token).await?;
                    return Err(AppError::authentication(INVALID_REFRESH_TOKEN));
                }
                (next.token, next.expires_at)
            }
        };

        info!(user_id = %user.id, rotation = %self.rotation, "Refreshed access token");

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Revokes one refresh token. Unknown or already revoked tokens are a no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.store.revoke(token).await?;
        Ok(())
    }

    /// Revokes every refresh token belonging to `user_id`.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.store.revoke_all(user_id).await
    }
}
