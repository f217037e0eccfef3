//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an environment overlay, and `WARDEN__*`
//! environment variables. Every field has a default, so an empty source
//! set still yields a usable configuration.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod security;

use std::net::IpAddr;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, RefreshRotation};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::security::SecurityConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides, e.g. `WARDEN__AUTH__JWT_SECRET`.
pub const ENV_PREFIX: &str = "WARDEN";

/// Accepted access token lifetimes, in minutes (up to one day).
pub const ACCESS_TTL_MINUTES: RangeInclusive<u64> = 1..=1440;

/// Accepted refresh token lifetimes, in days (up to one year).
pub const REFRESH_TTL_DAYS: RangeInclusive<u64> = 1..=365;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token and credential settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Rate limiting, request size, and header hardening.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Sources, lowest precedence first: `config/default.toml`,
    /// `config/{env}.toml`, then environment variables prefixed with
    /// `WARDEN` using `__` as the section separator.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.allowed_ips")
                    .with_list_parse_key("security.trusted_proxies")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would overflow token lifetimes or disable the
    /// security guards.
    pub fn validate(&self) -> Result<(), AppError> {
        let auth = &self.auth;
        if !ACCESS_TTL_MINUTES.contains(&auth.access_token_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "auth.access_token_ttl_minutes must be between {} and {}, got {}",
                ACCESS_TTL_MINUTES.start(),
                ACCESS_TTL_MINUTES.end(),
                auth.access_token_ttl_minutes
            )));
        }
        if !REFRESH_TTL_DAYS.contains(&auth.refresh_token_ttl_days) {
            return Err(AppError::configuration(format!(
                "auth.refresh_token_ttl_days must be between {} and {}, got {}",
                REFRESH_TTL_DAYS.start(),
                REFRESH_TTL_DAYS.end(),
                auth.refresh_token_ttl_days
            )));
        }
        if self.security.rate_limit_window_seconds == 0 {
            return Err(AppError::configuration(
                "security.rate_limit_window_seconds must be at least 1",
            ));
        }
        if let Some(bad) = self
            .security
            .trusted_proxies
            .iter()
            .find(|raw| raw.trim().parse::<IpAddr>().is_err())
        {
            return Err(AppError::configuration(format!(
                "security.trusted_proxies entry '{bad}' is not an IP address"
            )));
        }
        Ok(())
    }
}
