//! What happens once an address crosses the failed login threshold.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use warden_core::AppResult;
use warden_database::store::RequestLogStore;
use warden_entity::security::{CreateRequestLog, FailedLoginRecord};

/// Path recorded on security audit entries.
pub const SUSPICIOUS_ACTIVITY_PATH: &str = "/security/suspicious-activity";

/// Reacts to an address that has reached the failed login threshold.
///
/// Called on every failure at or past the threshold. Implementations must
/// not block the login response for long.
#[async_trait]
pub trait EscalationHook: Send + Sync + 'static {
    /// Handle an escalated record.
    async fn escalate(&self, record: &FailedLoginRecord) -> AppResult<()>;
}

/// Default hook: writes a security entry into the request log and warns.
#[derive(Clone)]
pub struct AuditLogEscalation {
    logs: Arc<dyn RequestLogStore>,
}

impl std::fmt::Debug for AuditLogEscalation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogEscalation").finish_non_exhaustive()
    }
}

impl AuditLogEscalation {
    /// Creates the hook over a request log store.
    pub fn new(logs: Arc<dyn RequestLogStore>) -> Self {
        Self { logs }
    }
}

#[async_trait]
impl EscalationHook for AuditLogEscalation {
    async fn escalate(&self, record: &FailedLoginRecord) -> AppResult<()> {
        warn!(
            ip = %record.ip_address,
            username = %record.username,
            attempts = record.attempts,
            "Suspicious login activity"
        );

        self.logs
            .append(CreateRequestLog {
                user_id: None,
                ip_address: record.ip_address.clone(),
                method: "SECURITY".to_string(),
                path: SUSPICIOUS_ACTIVITY_PATH.to_string(),
                user_agent: record.user_agent.clone(),
                status_code: 429,
                duration_ms: 0,
            })
            .await
    }
}
