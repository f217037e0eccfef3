//! Request throttling, size limits, address filtering, and proxy trust.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Security guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Requests admitted per client within one window.
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: usize,
    /// Sliding window length in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_seconds: u64,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: u64,
    /// Client addresses allowed to reach the API. Empty means no restriction.
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    /// Failed logins from one address before a security record is emitted.
    #[serde(default = "default_failed_login_threshold")]
    pub failed_login_threshold: i32,
    /// Reverse proxies whose `X-Forwarded-For` / `X-Real-IP` headers are
    /// believed. Empty means the socket peer address is always used.
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

impl SecurityConfig {
    /// Parsed proxy addresses. Entries that are not IP literals are skipped;
    /// configuration validation rejects them before this is reached.
    pub fn trusted_proxy_addrs(&self) -> Vec<IpAddr> {
        self.trusted_proxies
            .iter()
            .filter_map(|raw| raw.trim().parse().ok())
            .collect()
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_requests: default_rate_limit_requests(),
            rate_limit_window_seconds: default_rate_limit_window(),
            max_request_bytes: default_max_request_bytes(),
            allowed_ips: Vec::new(),
            failed_login_threshold: default_failed_login_threshold(),
            trusted_proxies: Vec::new(),
        }
    }
}

fn default_rate_limit_requests() -> usize {
    100
}

fn default_rate_limit_window() -> u64 {
    3600
}

fn default_max_request_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_failed_login_threshold() -> i32 {
    5
}
