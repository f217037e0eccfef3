//! The loaded identity used for authorization decisions.

use serde::Serialize;
use uuid::Uuid;

use crate::role::RoleWithPermissions;
use crate::user::User;

/// A user together with every role and permission assigned to them.
///
/// Loaded once per authenticated request; the authorization checks are
/// pure functions over this value.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    /// The user record.
    #[serde(flatten)]
    pub user: User,
    /// Assigned roles with their permissions.
    pub roles: Vec<RoleWithPermissions>,
}

impl Principal {
    /// Create a principal from a user and its roles.
    pub fn new(user: User, roles: Vec<RoleWithPermissions>) -> Self {
        Self { user, roles }
    }

    /// The user's identifier.
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    /// The user's login name.
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Whether the account is enabled.
    pub fn is_active(&self) -> bool {
        self.user.is_active
    }

    /// Names of all assigned roles.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.role.name.as_str())
    }
}
