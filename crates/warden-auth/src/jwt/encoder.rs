//! Access token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use warden_core::config::{ACCESS_TTL_MINUTES, AuthConfig};
use warden_core::error::AppError;
use warden_entity::user::User;

use super::claims::Claims;

/// Signs short-lived access tokens with HMAC-SHA256.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    header: Header,
    access_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &self.header.alg)
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
            access_ttl: Duration::minutes(
                config.access_token_ttl_minutes.min(*ACCESS_TTL_MINUTES.end()) as i64,
            ),
        }
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Signs an access token for `user` issued now.
    pub fn issue_access_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        self.issue_access_token_at(user, Utc::now())
    }

    /// Signs an access token for `user` issued at `now`.
    pub fn issue_access_token_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let expires_at = now + self.access_ttl;
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, expires_at))
    }
}
