//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{PageRequest, PageResponse};
use warden_entity::role::{Role, RoleWithPermissions};
use warden_entity::user::{CreateUser, UpdateUser, User, UserFilter};

use super::map_write_err;
use super::role::attach_permissions;
use crate::store::UserStore;

/// `WHERE` clause for [`UserFilter`]: `$1` active flag, `$2` ILIKE pattern.
const USER_FILTER: &str = "WHERE ($1::BOOLEAN IS NULL OR is_active = $1) \
     AND ($2::TEXT IS NULL OR username ILIKE $2 OR email ILIKE $2)";

/// Escape `LIKE` wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for user CRUD and role assignment.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $7) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err("Failed to create user", "username or email already exists", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to find user by id", e))
    }

    async fn find_by_login(&self, identifier: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1 OR email = $1 LIMIT 1")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to find user by login", e))
    }

    async fn exists_by_username_or_email(&self, username: &str, email: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to check user uniqueness", e))
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let pattern = filter.search_term().map(|term| format!("%{}%", escape_like(term)));

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {USER_FILTER}"))
            .bind(filter.active)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users {USER_FILTER} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(filter.active)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to list users", e))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($2, email), first_name = COALESCE($3, first_name), \
             last_name = COALESCE($4, last_name), is_active = COALESCE($5, is_active), updated_at = $6 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_err("Failed to update user", "email already exists", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn roles_for(&self, user_id: Uuid) -> AppResult<Vec<RoleWithPermissions>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT r.* FROM roles r JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to load user roles", e))?;

        attach_permissions(&self.pool, roles).await
    }

    async fn assign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        assigned_by: Option<Uuid>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id, assigned_by) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(assigned_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to assign role", e))?;
        Ok(())
    }

    async fn replace_roles(
        &self,
        user_id: Uuid,
        role_ids: &[Uuid],
        assigned_by: Option<Uuid>,
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::storage("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::storage("Failed to clear user roles", e))?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id, assigned_by) \
             SELECT $1, UNNEST($2::uuid[]), $3 ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_ids)
        .bind(assigned_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::storage("Failed to insert user roles", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::storage("Failed to commit role assignment", e))
    }
}
