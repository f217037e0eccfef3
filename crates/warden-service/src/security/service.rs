//! Read access to failed login records and the request audit log.

use std::sync::Arc;

use warden_core::error::AppError;
use warden_core::types::{PageRequest, PageResponse};
use warden_database::store::{FailedLoginStore, RequestLogStore};
use warden_entity::security::{FailedLoginRecord, RequestLog};

/// Largest number of audit entries returned at once.
const MAX_RECENT_LOGS: u64 = 500;

/// Exposes security telemetry to administrators.
#[derive(Clone)]
pub struct SecurityService {
    failed_logins: Arc<dyn FailedLoginStore>,
    request_logs: Arc<dyn RequestLogStore>,
}

impl std::fmt::Debug for SecurityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityService").finish_non_exhaustive()
    }
}

impl SecurityService {
    /// Creates a new security service.
    pub fn new(
        failed_logins: Arc<dyn FailedLoginStore>,
        request_logs: Arc<dyn RequestLogStore>,
    ) -> Self {
        Self {
            failed_logins,
            request_logs,
        }
    }

    /// Failed login records, most recent first.
    pub async fn failed_logins(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<FailedLoginRecord>, AppError> {
        self.failed_logins.list(page.normalized()).await
    }

    /// The most recent audit entries, capped.
    pub async fn recent_requests(&self, limit: u64) -> Result<Vec<RequestLog>, AppError> {
        self.request_logs.recent(limit.clamp(1, MAX_RECENT_LOGS)).await
    }
}
