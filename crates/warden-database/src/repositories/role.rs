//! Role repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::permission::Permission;
use warden_entity::role::{CreateRole, Role, RoleWithPermissions, UpdateRole};

use super::map_write_err;
use crate::store::RoleStore;

/// A permission row joined with the role that carries it.
#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    #[sqlx(flatten)]
    permission: Permission,
}

/// Load the permissions of each role in one query.
pub(crate) async fn attach_permissions(
    pool: &PgPool,
    roles: Vec<Role>,
) -> AppResult<Vec<RoleWithPermissions>> {
    if roles.is_empty() {
        return Ok(Vec::new());
    }

    let role_ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();
    let rows = sqlx::query_as::<_, RolePermissionRow>(
        "SELECT rp.role_id, p.* FROM permissions p \
         JOIN role_permissions rp ON rp.permission_id = p.id \
         WHERE rp.role_id = ANY($1) ORDER BY p.resource, p.action",
    )
    .bind(&role_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::storage("Failed to load role permissions", e))?;

    let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
    for row in rows {
        by_role.entry(row.role_id).or_default().push(row.permission);
    }

    Ok(roles
        .into_iter()
        .map(|role| {
            let permissions = by_role.remove(&role.id).unwrap_or_default();
            RoleWithPermissions { role, permissions }
        })
        .collect())
}

/// Repository for role CRUD.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, role: Option<Role>) -> AppResult<Option<RoleWithPermissions>> {
        match role {
            Some(role) => Ok(attach_permissions(&self.pool, vec![role]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn create(&self, data: CreateRole) -> AppResult<RoleWithPermissions> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::storage("Failed to begin transaction", e))?;

        let role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, name, description, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.name)
        .bind(&data.description)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_err("Failed to create role", "role name already exists", e))?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) \
             SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(role.id)
        .bind(&data.permission_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::storage("Failed to attach role permissions", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::storage("Failed to commit role", e))?;

        self.load(Some(role))
            .await?
            .ok_or_else(|| AppError::internal("Role vanished after insert"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoleWithPermissions>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to find role", e))?;
        self.load(role).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to find role by name", e))
    }

    async fn list(&self) -> AppResult<Vec<RoleWithPermissions>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to list roles", e))?;
        attach_permissions(&self.pool, roles).await
    }

    async fn update(&self, id: Uuid, data: &UpdateRole) -> AppResult<Option<RoleWithPermissions>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::storage("Failed to begin transaction", e))?;

        let role = sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = COALESCE($2, name), description = COALESCE($3, description) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_err("Failed to update role", "role name already exists", e))?;

        let Some(role) = role else {
            return Ok(None);
        };

        if let Some(permission_ids) = &data.permission_ids {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::storage("Failed to clear role permissions", e))?;
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id) \
                 SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(permission_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::storage("Failed to attach role permissions", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::storage("Failed to commit role update", e))?;

        self.load(Some(role)).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to delete role", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_members(&self, role_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to count role members", e))?;
        Ok(count as u64)
    }
}
