//! Failed login tracking and escalation.

pub mod escalation;
pub mod failed_login;

pub use escalation::{AuditLogEscalation, EscalationHook, SUSPICIOUS_ACTIVITY_PATH};
pub use failed_login::FailedLoginGuard;
