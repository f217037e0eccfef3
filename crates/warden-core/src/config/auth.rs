//! Token and credential configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Insecure signing secret used when none is configured.
///
/// Any real deployment must override it through `WARDEN__AUTH__JWT_SECRET`
/// or a config file; the server logs a warning at startup while it is in use.
pub const FALLBACK_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// What happens to a refresh token when it is exchanged for a new access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshRotation {
    /// Return the same refresh token; it stays valid until expiry or revocation.
    Reuse,
    /// Issue a new refresh token and revoke the presented one.
    Rotate,
}

impl fmt::Display for RefreshRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => write!(f, "reuse"),
            Self::Rotate => write!(f, "rotate"),
        }
    }
}

/// Authentication and credential configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access-token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Refresh token rotation policy.
    #[serde(default = "default_rotation")]
    pub refresh_rotation: RefreshRotation,
    /// Minimum password length at registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Interval between purges of expired and revoked refresh tokens.
    #[serde(default = "default_cleanup_interval")]
    pub token_cleanup_interval_seconds: u64,
}

impl AuthConfig {
    /// Whether the signing secret is still the documented fallback.
    pub fn uses_fallback_secret(&self) -> bool {
        self.jwt_secret == FALLBACK_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            refresh_rotation: default_rotation(),
            password_min_length: default_password_min(),
            token_cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("refresh_rotation", &self.refresh_rotation)
            .field("password_min_length", &self.password_min_length)
            .field(
                "token_cleanup_interval_seconds",
                &self.token_cleanup_interval_seconds,
            )
            .finish()
    }
}

fn default_jwt_secret() -> String {
    FALLBACK_JWT_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_rotation() -> RefreshRotation {
    RefreshRotation::Rotate
}

fn default_password_min() -> usize {
    6
}

fn default_cleanup_interval() -> u64 {
    3600
}
