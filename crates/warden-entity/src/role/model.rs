//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::permission::Permission;

/// Roles that are seeded at startup and cannot be deleted.
pub const DEFAULT_ROLES: [&str; 3] = ["admin", "user", "moderator"];

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Unique role name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Whether this is one of the protected default roles.
    pub fn is_protected(&self) -> bool {
        DEFAULT_ROLES.contains(&self.name.as_str())
    }
}

/// A role with its permissions loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    /// The role.
    #[serde(flatten)]
    pub role: Role,
    /// Permissions carried by the role.
    pub permissions: Vec<Permission>,
}

/// Data required to create a role.
#[derive(Debug, Clone)]
pub struct CreateRole {
    /// Unique role name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Permissions to attach.
    pub permission_ids: Vec<Uuid>,
}

/// Partial update of a role.
#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement permission set.
    pub permission_ids: Option<Vec<Uuid>>,
}
