//! Permission entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An atomic `(resource, action)` authorization unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: Uuid,
    /// Unique name, conventionally `resource.action`.
    pub name: String,
    /// Resource the permission applies to.
    pub resource: String,
    /// Action allowed on the resource.
    pub action: String,
    /// Free-text description.
    pub description: String,
    /// When the permission was created.
    pub created_at: DateTime<Utc>,
}

impl Permission {
    /// Exact, case-sensitive match on the `(resource, action)` pair.
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }
}

/// Data required to create a permission.
#[derive(Debug, Clone)]
pub struct CreatePermission {
    /// Unique name.
    pub name: String,
    /// Resource.
    pub resource: String,
    /// Action.
    pub action: String,
    /// Free-text description.
    pub description: String,
}

/// Partial update of a permission. `None` fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePermission {
    pub name: Option<String>,
    pub resource: Option<String>,
    pub action: Option<String>,
    pub description: Option<String>,
}

impl UpdatePermission {
    /// The permission as it would read after this update.
    pub fn apply_to(&self, permission: &Permission) -> Permission {
        Permission {
            name: self.name.clone().unwrap_or_else(|| permission.name.clone()),
            resource: self
                .resource
                .clone()
                .unwrap_or_else(|| permission.resource.clone()),
            action: self.action.clone().unwrap_or_else(|| permission.action.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| permission.description.clone()),
            ..permission.clone()
        }
    }
}
