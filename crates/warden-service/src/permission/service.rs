//! Permission catalogue management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_database::store::PermissionStore;
use warden_entity::permission::{CreatePermission, Permission, UpdatePermission};

use crate::context::RequestContext;

/// Handles the permission catalogue.
#[derive(Clone)]
pub struct PermissionService {
    permissions: Arc<dyn PermissionStore>,
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService").finish_non_exhaustive()
    }
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(permissions: Arc<dyn PermissionStore>) -> Self {
        Self { permissions }
    }

    /// All permissions.
    pub async fn list(&self) -> Result<Vec<Permission>, AppError> {
        self.permissions.list().await
    }

    /// One permission by id.
    pub async fn get(&self, id: Uuid) -> Result<Permission, AppError> {
        self.permissions
            .find_many(&[id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("permission not found"))
    }

    /// Creates a permission. Both the name and the `(resource, action)` pair are unique.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        data: CreatePermission,
    ) -> Result<Permission, AppError> {
        let data = CreatePermission {
            name: data.name.trim().to_string(),
            resource: data.resource.trim().to_string(),
            action: data.action.trim().to_string(),
            description: data.description,
        };
        if data.name.is_empty() || data.resource.is_empty() || data.action.is_empty() {
            return Err(AppError::validation("name, resource and action are required"));
        }

        let taken = self.permissions.find_by_name(&data.name).await?.is_some()
            || self
                .permissions
                .find_by_resource_action(&data.resource, &data.action)
                .await?
                .is_some();
        if taken {
            return Err(AppError::conflict("permission already exists"));
        }

        let permission = self.permissions.create(data).await?;
        info!(permission = %permission.name, created_by = %ctx.user_id(), "Permission created");
        Ok(permission)
    }

    /// Applies a partial update. The new name and pair must not belong to
    /// another permission.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdatePermission,
    ) -> Result<Permission, AppError> {
        let current = self.get(id).await?;

        let data = UpdatePermission {
            name: trimmed(data.name, "name")?,
            resource: trimmed(data.resource, "resource")?,
            action: trimmed(data.action, "action")?,
            description: data.description,
        };
        let target = data.apply_to(&current);

        let name_taken = self
            .permissions
            .find_by_name(&target.name)
            .await?
            .is_some_and(|p| p.id != id);
        let pair_taken = self
            .permissions
            .find_by_resource_action(&target.resource, &target.action)
            .await?
            .is_some_and(|p| p.id != id);
        if name_taken || pair_taken {
            return Err(AppError::conflict("permission already exists"));
        }

        let permission = self
            .permissions
            .update(id, &data)
            .await?
            .ok_or_else(|| AppError::not_found("permission not found"))?;
        info!(permission = %permission.name, updated_by = %ctx.user_id(), "Permission updated");
        Ok(permission)
    }

    /// Deletes a permission no role grants.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let permission = self.get(id).await?;

        if self.permissions.count_roles(id).await? > 0 {
            return Err(AppError::conflict("cannot delete permission granted to roles"));
        }
        if !self.permissions.delete(id).await? {
            return Err(AppError::conflict("cannot delete permission granted to roles"));
        }
        info!(permission = %permission.name, deleted_by = %ctx.user_id(), "Permission deleted");
        Ok(())
    }
}

fn trimmed(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(AppError::validation(format!("{field} must not be blank"))),
        other => Ok(other),
    }
}
