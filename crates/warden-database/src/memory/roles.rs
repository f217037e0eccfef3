use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::role::{CreateRole, Role, RoleWithPermissions, UpdateRole};

use super::MemoryStore;
use crate::store::RoleStore;

#[async_trait]
impl RoleStore for MemoryStore {
    async fn create(&self, data: CreateRole) -> AppResult<RoleWithPermissions> {
        let mut state = self.state.lock().await;
        if state.roles.values().any(|r| r.name == data.name) {
            return Err(AppError::conflict("role name already exists"));
        }
        let role = Role {
            id: Uuid::now_v7(),
            name: data.name,
            description: data.description,
            created_at: Utc::now(),
        };
        let permission_ids = state.known_permission_ids(&data.permission_ids);
        state.role_permissions.insert(role.id, permission_ids);
        state.roles.insert(role.id, role.clone());
        Ok(state.with_permissions(&role))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoleWithPermissions>> {
        let state = self.state.lock().await;
        Ok(state.roles.get(&id).map(|r| state.with_permissions(r)))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.lock().await;
        Ok(state.roles.values().find(|r| r.name == name).cloned())
    }

    async fn list(&self) -> AppResult<Vec<RoleWithPermissions>> {
        let state = self.state.lock().await;
        let mut roles: Vec<RoleWithPermissions> =
            state.roles.values().map(|r| state.with_permissions(r)).collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(roles)
    }

    async fn update(&self, id: Uuid, data: &UpdateRole) -> AppResult<Option<RoleWithPermissions>> {
        let mut state = self.state.lock().await;
        if let Some(name) = &data.name {
            if state.roles.values().any(|r| r.id != id && &r.name == name) {
                return Err(AppError::conflict("role name already exists"));
            }
        }
        let permission_ids = data
            .permission_ids
            .as_deref()
            .map(|ids| state.known_permission_ids(ids));

        let Some(role) = state.roles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &data.name {
            role.name = name.clone();
        }
        if let Some(description) = &data.description {
            role.description = description.clone();
        }
        let role = role.clone();
        if let Some(ids) = permission_ids {
            state.role_permissions.insert(id, ids);
        }
        Ok(Some(state.with_permissions(&role)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.assignments.iter().any(|a| a.role_id == id) {
            return Err(AppError::conflict("role is still assigned to users"));
        }
        state.role_permissions.remove(&id);
        Ok(state.roles.remove(&id).is_some())
    }

    async fn count_members(&self, role_id: Uuid) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .iter()
            .filter(|a| a.role_id == role_id)
            .count() as u64)
    }
}
