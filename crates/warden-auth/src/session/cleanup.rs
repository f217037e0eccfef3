//! Periodic purge of expired and revoked refresh tokens.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::store::SessionStore;

/// Background task that deletes unusable refresh tokens on an interval.
#[derive(Debug, Clone)]
pub struct TokenCleanup {
    store: SessionStore,
    interval: Duration,
}

impl TokenCleanup {
    /// Creates a cleanup task running every `interval`.
    pub fn new(store: SessionStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs one purge pass and returns the number of deleted tokens.
    ///
    /// Failures are logged and reported as zero deletions.
    pub async fn run_once(&self) -> u64 {
        match self.store.purge_expired().await {
            Ok(0) => {
                debug!("Token cleanup: nothing to purge");
                0
            }
            Ok(purged) => {
                info!(purged, "Token cleanup: purged refresh tokens");
                purged
            }
            Err(e) => {
                error!(error = %e, "Token cleanup failed");
                0
            }
        }
    }

    /// Spawns the purge loop. It stops when `shutdown` changes or its sender drops.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                    _ = shutdown.changed() => {
                        debug!("Token cleanup stopping");
                        break;
                    }
                }
            }
        })
    }
}
