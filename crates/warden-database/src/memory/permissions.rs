use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::permission::{CreatePermission, Permission, UpdatePermission};

use super::MemoryStore;
use crate::store::PermissionStore;

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn create(&self, data: CreatePermission) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        if state
            .permissions
            .values()
            .any(|p| p.name == data.name || p.grants(&data.resource, &data.action))
        {
            return Err(AppError::conflict("permission already exists"));
        }
        let permission = Permission {
            id: Uuid::now_v7(),
            name: data.name,
            resource: data.resource,
            action: data.action,
            description: data.description,
            created_at: Utc::now(),
        };
        state.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let state = self.state.lock().await;
        Ok(state.permissions.values().find(|p| p.name == name).cloned())
    }

    async fn find_by_resource_action(
        &self,
        resource: &str,
        action: &str,
    ) -> AppResult<Option<Permission>> {
        let state = self.state.lock().await;
        Ok(state
            .permissions
            .values()
            .find(|p| p.grants(resource, action))
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Permission>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.permissions.get(id).cloned())
            .collect())
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        let state = self.state.lock().await;
        let mut permissions: Vec<Permission> = state.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| (&a.resource, &a.action).cmp(&(&b.resource, &b.action)));
        Ok(permissions)
    }

    async fn update(&self, id: Uuid, data: &UpdatePermission) -> AppResult<Option<Permission>> {
        let mut state = self.state.lock().await;
        let Some(current) = state.permissions.get(&id) else {
            return Ok(None);
        };
        let updated = data.apply_to(current);
        if state.permissions.values().any(|p| {
            p.id != id && (p.name == updated.name || p.grants(&updated.resource, &updated.action))
        }) {
            return Err(AppError::conflict("permission already exists"));
        }
        state.permissions.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.role_permissions.values().any(|ids| ids.contains(&id)) {
            return Err(AppError::conflict("permission is still granted to roles"));
        }
        Ok(state.permissions.remove(&id).is_some())
    }

    async fn count_roles(&self, permission_id: Uuid) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .role_permissions
            .values()
            .filter(|ids| ids.contains(&permission_id))
            .count() as u64)
    }
}
