//! Role CRUD with protection of the default roles.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_database::store::{PermissionStore, RoleStore};
use warden_entity::role::{CreateRole, RoleWithPermissions, UpdateRole};

use crate::context::RequestContext;

/// Handles role administration.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService").finish_non_exhaustive()
    }
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(roles: Arc<dyn RoleStore>, permissions: Arc<dyn PermissionStore>) -> Self {
        Self { roles, permissions }
    }

    /// All roles with their permissions.
    pub async fn list(&self) -> Result<Vec<RoleWithPermissions>, AppError> {
        self.roles.list().await
    }

    /// One role by id.
    pub async fn get(&self, id: Uuid) -> Result<RoleWithPermissions, AppError> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("role not found"))
    }

    /// Creates a role. Names are unique.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        data: CreateRole,
    ) -> Result<RoleWithPermissions, AppError> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("role name is required"));
        }
        if self.roles.find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict("role name already exists"));
        }
        self.ensure_permissions_exist(&data.permission_ids).await?;

        let role = self.roles.create(CreateRole { name, ..data }).await?;
        info!(role = %role.role.name, created_by = %ctx.user_id(), "Role created");
        Ok(role)
    }

    /// Applies a partial update. Default roles cannot be renamed.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        mut data: UpdateRole,
    ) -> Result<RoleWithPermissions, AppError> {
        let current = self.get(id).await?;

        if let Some(name) = data.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("role name is required"));
            }
            if name != current.role.name {
                if current.role.is_protected() {
                    return Err(AppError::validation("cannot rename a default role"));
                }
                if self.roles.find_by_name(&name).await?.is_some() {
                    return Err(AppError::conflict("role name already exists"));
                }
            }
            data.name = Some(name);
        }
        if let Some(ids) = &data.permission_ids {
            self.ensure_permissions_exist(ids).await?;
        }

        let role = self
            .roles
            .update(id, &data)
            .await?
            .ok_or_else(|| AppError::not_found("role not found"))?;
        info!(role = %role.role.name, updated_by = %ctx.user_id(), "Role updated");
        Ok(role)
    }

    /// Deletes a role that is neither a default role nor assigned to anyone.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let role = self.get(id).await?.role;

        if role.is_protected() {
            return Err(AppError::validation("cannot delete default role"));
        }
        if self.roles.count_members(id).await? > 0 {
            return Err(AppError::conflict("cannot delete role with assigned users"));
        }

        self.roles.delete(id).await?;
        info!(role = %role.name, deleted_by = %ctx.user_id(), "Role deleted");
        Ok(())
    }

    async fn ensure_permissions_exist(&self, ids: &[Uuid]) -> Result<(), AppError> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let found = self.permissions.find_many(&unique).await?;
        if found.len() != unique.len() {
            return Err(AppError::validation("invalid permission ids"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, fixture};
    use chrono::Utc;
    use warden_core::ErrorKind;
    use warden_database::store::UserStore;
    use warden_entity::user::{CreateUser, Principal, User};

    fn ctx() -> RequestContext {
        let now = Utc::now();
        RequestContext::new(
            Principal::new(
                User {
                    id: Uuid::new_v4(),
                    username: "root".to_string(),
                    email: "root@x.com".to_string(),
                    password_hash: String::new(),
                    first_name: None,
                    last_name: None,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
                Vec::new(),
            ),
            client(),
        )
    }

    fn editor(permission_ids: Vec<Uuid>) -> CreateRole {
        CreateRole {
            name: "editor".to_string(),
            description: "Edits things".to_string(),
            permission_ids,
        }
    }

    #[tokio::test]
    async fn test_create_checks_name_and_permissions() {
        let f = fixture().await;
        let roles = RoleService::new(f.stores.roles.clone(), f.stores.permissions.clone());
        let read = f.stores.permissions.find_by_name("users.read").await.unwrap().unwrap();

        let created = roles.create(&ctx(), editor(vec![read.id])).await.unwrap();
        assert_eq!(created.permissions.len(), 1);

        let dup = roles.create(&ctx(), editor(vec![])).await.unwrap_err();
        assert_eq!(dup.kind, ErrorKind::Conflict);

        let bad = roles
            .create(
                &ctx(),
                CreateRole {
                    name: "viewer".to_string(),
                    ..editor(vec![Uuid::new_v4()])
                },
            )
            .await
            .unwrap_err();
        assert_eq!(bad.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_default_roles_are_protected() {
        let f = fixture().await;
        let roles = RoleService::new(f.stores.roles.clone(), f.stores.permissions.clone());
        let admin = f.stores.roles.find_by_name("admin").await.unwrap().unwrap();

        let err = roles.delete(&ctx(), admin.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = roles
            .update(
                &ctx(),
                admin.id,
                UpdateRole {
                    name: Some("superuser".to_string()),
                    ..UpdateRole::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_role_in_use_cannot_be_deleted() {
        let f = fixture().await;
        let roles = RoleService::new(f.stores.roles.clone(), f.stores.permissions.clone());
        let role = roles.create(&ctx(), editor(vec![])).await.unwrap();
        let user = f
            .stores
            .users
            .create(CreateUser {
                username: "gina".to_string(),
                email: "gina@x.com".to_string(),
                password_hash: "unused".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();
        f.stores.users.assign_role(user.id, role.role.id, None).await.unwrap();

        let err = roles.delete(&ctx(), role.role.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        f.stores.users.replace_roles(user.id, &[], None).await.unwrap();
        roles.delete(&ctx(), role.role.id).await.unwrap();
        assert_eq!(roles.get(role.role.id).await.unwrap_err().kind, ErrorKind::NotFound);
    }
}
