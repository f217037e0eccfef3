//! Route-level authorization requirements.

use std::fmt;

use warden_core::error::AppError;
use warden_entity::user::Principal;

use super::resolver::{has_any_role, has_permission, has_role};

/// Message for a failed permission requirement.
pub const INSUFFICIENT_PERMISSIONS: &str = "insufficient permissions";
/// Message for a failed role requirement.
pub const INSUFFICIENT_ROLE: &str = "insufficient role";

/// What a route demands of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A `(resource, action)` permission.
    Permission {
        /// Resource name.
        resource: &'static str,
        /// Action name.
        action: &'static str,
    },
    /// A single role by name.
    Role(&'static str),
    /// Any one of several roles.
    AnyRole(&'static [&'static str]),
}

impl Requirement {
    /// Requires the `(resource, action)` permission.
    pub const fn permission(resource: &'static str, action: &'static str) -> Self {
        Self::Permission { resource, action }
    }

    /// Requires the named role.
    pub const fn role(name: &'static str) -> Self {
        Self::Role(name)
    }

    /// Requires any one of the named roles.
    pub const fn any_role(names: &'static [&'static str]) -> Self {
        Self::AnyRole(names)
    }

    /// Whether `principal` satisfies this requirement.
    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        match *self {
            Self::Permission { resource, action } => has_permission(principal, resource, action),
            Self::Role(name) => has_role(principal, name),
            Self::AnyRole(names) => has_any_role(principal, names),
        }
    }

    /// Checks `principal`, failing with an authorization error.
    ///
    /// A disabled principal never satisfies any requirement.
    pub fn check(&self, principal: &Principal) -> Result<(), AppError> {
        if principal.is_active() && self.is_satisfied_by(principal) {
            return Ok(());
        }
        let message = match self {
            Self::Permission { .. } => INSUFFICIENT_PERMISSIONS,
            Self::Role(_) | Self::AnyRole(_) => INSUFFICIENT_ROLE,
        };
        Err(AppError::authorization(message))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission { resource, action } => write!(f, "permission {resource}.{action}"),
            Self::Role(name) => write!(f, "role {name}"),
            Self::AnyRole(names) => write!(f, "any role of [{}]", names.join(", ")),
        }
    }
}
