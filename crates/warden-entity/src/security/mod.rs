//! Security audit entities.

pub mod failed_login;
pub mod request_log;

pub use failed_login::{FailedLoginAttempt, FailedLoginRecord};
pub use request_log::{CreateRequestLog, RequestLog};
