//! Sliding-window rate limiter keyed by client address.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use tracing::warn;

use warden_core::config::SecurityConfig;
use warden_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::Client;
use crate::state::AppState;

/// In-memory sliding-window limiter.
///
/// Each client keeps the instants of its accepted requests. A check prunes
/// instants older than the window, rejects once the remainder reaches the
/// ceiling, and otherwise records the current instant. The prune, count, and
/// record for one client run under that client's map shard lock. Windows are
/// per process: several instances behind a balancer each enforce their own
/// ceiling, and a restart forgets all history.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_requests` per `window` per client.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    /// Creates a limiter from security configuration.
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_seconds),
        )
    }

    /// Records a request from `key` now. Returns `false` if it must be rejected.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Records a request from `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.windows.entry(key.to_string()).or_default();

        while let Some(oldest) = hits.front() {
            match now.checked_duration_since(*oldest) {
                Some(age) if age >= self.window => {
                    hits.pop_front();
                }
                _ => break,
            }
        }

        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push_back(now);
        true
    }

    /// Drops clients whose whole history is older than the window.
    pub fn sweep(&self, now: Instant) {
        self.windows.retain(|_, hits| {
            hits.back().is_some_and(|last| {
                now.checked_duration_since(*last)
                    .is_none_or(|age| age < self.window)
            })
        });
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Rejects requests over the per-client ceiling with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    Client(client): Client,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.rate_limiter.check(&client.ip_address) {
        warn!(ip = %client.ip_address, path = %request.uri().path(), "Rate limit exceeded");
        return Err(AppError::rate_limit("rate limit exceeded").into());
    }
    Ok(next.run(request).await)
}
