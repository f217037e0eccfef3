//! Request context carrying the authenticated principal and client details.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_entity::user::Principal;

/// Where a request came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client address used for rate limiting and failed login tracking.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Creates client info.
    pub fn new(ip_address: impl Into<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent,
        }
    }
}

/// Context for the current authenticated request.
///
/// Built by the authentication middleware after the principal has been
/// loaded and checked active, then handed to every service call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The acting principal with roles and permissions.
    pub principal: Arc<Principal>,
    /// Client details.
    pub client: ClientInfo,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(principal: Principal, client: ClientInfo) -> Self {
        Self {
            principal: Arc::new(principal),
            client,
            request_time: Utc::now(),
        }
    }

    /// The acting user's ID.
    pub fn user_id(&self) -> Uuid {
        self.principal.id()
    }

    /// The acting user's login name.
    pub fn username(&self) -> &str {
        self.principal.username()
    }
}
