//! Permission repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::permission::{CreatePermission, Permission, UpdatePermission};

use super::map_write_err;
use crate::store::PermissionStore;

/// Repository for the permission catalogue.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PermissionRepository {
    async fn create(&self, data: CreatePermission) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (id, name, resource, action, description, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.name)
        .bind(&data.resource)
        .bind(&data.action)
        .bind(&data.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err("Failed to create permission", "permission already exists", e))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to find permission by name", e))
    }

    async fn find_by_resource_action(
        &self,
        resource: &str,
        action: &str,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE resource = $1 AND action = $2",
        )
        .bind(resource)
        .bind(action)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to find permission by pair", e))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to load permissions", e))
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY resource, action")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to list permissions", e))
    }

    async fn update(&self, id: Uuid, data: &UpdatePermission) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET name = COALESCE($2, name), resource = COALESCE($3, resource), \
             action = COALESCE($4, action), description = COALESCE($5, description) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.resource)
        .bind(&data.action)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_err("Failed to update permission", "permission already exists", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM permissions WHERE id = $1 \
             AND NOT EXISTS (SELECT 1 FROM role_permissions WHERE permission_id = $1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to delete permission", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_roles(&self, permission_id: Uuid) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM role_permissions WHERE permission_id = $1")
                .bind(permission_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::storage("Failed to count permission grants", e))?;
        Ok(count as u64)
    }
}
