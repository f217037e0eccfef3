//! In-memory store for tests and single-process development runs.
//!
//! One [`MemoryStore`] implements every store trait over a shared state
//! guarded by a Tokio mutex, so `Stores::memory` hands out views of the
//! same data.

mod permissions;
mod roles;
mod security;
mod tokens;
mod users;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use warden_entity::permission::Permission;
use warden_entity::role::{Role, RoleWithPermissions};
use warden_entity::security::{FailedLoginRecord, RequestLog};
use warden_entity::token::RefreshToken;
use warden_entity::user::User;

/// One user-role assignment.
#[derive(Debug, Clone)]
struct Assignment {
    user_id: Uuid,
    role_id: Uuid,
}

/// Tables held by the in-memory store.
#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<Uuid, User>,
    roles: HashMap<Uuid, Role>,
    permissions: HashMap<Uuid, Permission>,
    role_permissions: HashMap<Uuid, Vec<Uuid>>,
    assignments: Vec<Assignment>,
    refresh_tokens: HashMap<String, RefreshToken>,
    failed_logins: HashMap<String, FailedLoginRecord>,
    request_logs: Vec<RequestLog>,
}

impl InnerState {
    fn with_permissions(&self, role: &Role) -> RoleWithPermissions {
        let mut permissions: Vec<Permission> = self
            .role_permissions
            .get(&role.id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.permissions.get(id).cloned())
            .collect();
        permissions.sort_by(|a, b| (&a.resource, &a.action).cmp(&(&b.resource, &b.action)));
        RoleWithPermissions {
            role: role.clone(),
            permissions,
        }
    }

    fn known_permission_ids(&self, ids: &[Uuid]) -> Vec<Uuid> {
        let mut known: Vec<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| self.permissions.contains_key(id))
            .collect();
        known.sort_unstable();
        known.dedup();
        known
    }
}

/// In-memory implementation of every store trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}
