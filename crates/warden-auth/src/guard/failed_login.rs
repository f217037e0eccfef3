//! Per-address failed login counting.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use warden_core::error::AppError;
use warden_database::store::FailedLoginStore;
use warden_entity::security::{FailedLoginAttempt, FailedLoginRecord};

use super::escalation::EscalationHook;

/// Records failed logins and escalates past a threshold.
///
/// The guard never blocks a login itself; blocking, if any, is the hook's call.
#[derive(Clone)]
pub struct FailedLoginGuard {
    store: Arc<dyn FailedLoginStore>,
    threshold: i32,
    hook: Arc<dyn EscalationHook>,
}

impl std::fmt::Debug for FailedLoginGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailedLoginGuard")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl FailedLoginGuard {
    /// Creates a guard escalating at `threshold` attempts.
    pub fn new(
        store: Arc<dyn FailedLoginStore>,
        threshold: i32,
        hook: Arc<dyn EscalationHook>,
    ) -> Self {
        Self {
            store,
            threshold,
            hook,
        }
    }

    /// Escalation threshold.
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Upserts the record for the attempt's address and escalates if it has
    /// reached the threshold. Returns the updated record.
    pub async fn record(&self, attempt: &FailedLoginAttempt) -> Result<FailedLoginRecord, AppError> {
        let record = self.store.record_failure(attempt, Utc::now()).await?;
        debug!(ip = %record.ip_address, attempts = record.attempts, "Recorded failed login");

        if record.attempts >= self.threshold {
            self.hook.escalate(&record).await?;
        }

        Ok(record)
    }
}
