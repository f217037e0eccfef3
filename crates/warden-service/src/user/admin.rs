//! Admin user management: listing, creation, updates, deletion, role changes.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use warden_auth::{PasswordHasher, PasswordValidator, SessionManager};
use warden_core::error::AppError;
use warden_core::types::{PageRequest, PageResponse};
use warden_database::store::{RoleStore, UserStore};
use warden_entity::user::{CreateUser, Principal, UpdateUser, User, UserFilter};

use crate::auth::service::DEFAULT_SIGNUP_ROLE;
use crate::context::RequestContext;
use crate::validation::{validate_email, validate_username};

/// Admin-created account.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Unique login name.
    pub username: String,
    /// Unique email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Initial roles; empty means the default signup role.
    pub role_ids: Vec<Uuid>,
}

/// Handles administrative user operations.
#[derive(Clone)]
pub struct UserAdminService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    sessions: SessionManager,
}

impl std::fmt::Debug for UserAdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAdminService").finish_non_exhaustive()
    }
}

impl UserAdminService {
    /// Creates a new admin user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        hasher: PasswordHasher,
        validator: PasswordValidator,
        sessions: SessionManager,
    ) -> Self {
        Self {
            users,
            roles,
            hasher,
            validator,
            sessions,
        }
    }

    /// Lists users matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<PageResponse<User>, AppError> {
        self.users.list(filter, page.normalized()).await
    }

    /// Gets a user with roles and permissions.
    pub async fn get(&self, id: Uuid) -> Result<Principal, AppError> {
        self.users
            .load_principal(id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    /// Creates a user on behalf of an admin.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> Result<Principal, AppError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_string();
        validate_username(&username)?;
        validate_email(&email)?;
        self.validator.validate(&input.password)?;

        let role_ids = if input.role_ids.is_empty() {
            match self.roles.find_by_name(DEFAULT_SIGNUP_ROLE).await? {
                Some(role) => vec![role.id],
                None => Vec::new(),
            }
        } else {
            self.ensure_roles_exist(&input.role_ids).await?;
            input.role_ids
        };

        if self
            .users
            .exists_by_username_or_email(&username, &email)
            .await?
        {
            return Err(AppError::conflict("username or email already exists"));
        }

        let password_hash = self.hasher.hash_password_blocking(input.password).await?;
        let user = self
            .users
            .create(CreateUser {
                username,
                email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await?;
        self.users
            .replace_roles(user.id, &role_ids, Some(ctx.user_id()))
            .await?;

        info!(user_id = %user.id, created_by = %ctx.user_id(), "User created");
        self.get(user.id).await
    }

    /// Applies a partial update. Disabling an account revokes its refresh tokens.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<User, AppError> {
        if let Some(email) = &data.email {
            validate_email(email)?;
        }

        let user = self
            .users
            .update(id, &data)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if data.is_active == Some(false) {
            self.sessions.revoke_all(id).await?;
            info!(user_id = %id, disabled_by = %ctx.user_id(), "User disabled");
        } else {
            info!(user_id = %id, updated_by = %ctx.user_id(), "User updated");
        }

        Ok(user)
    }

    /// Deletes a user and revokes their refresh tokens. Self-deletion is refused.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        if id == ctx.user_id() {
            return Err(AppError::validation("cannot delete your own account"));
        }
        if self.users.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("user not found"));
        }

        self.sessions.revoke_all(id).await?;
        self.users.delete(id).await?;

        info!(user_id = %id, deleted_by = %ctx.user_id(), "User deleted");
        Ok(())
    }

    /// Replaces the user's role set.
    pub async fn replace_roles(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        role_ids: Vec<Uuid>,
    ) -> Result<Principal, AppError> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("user not found"));
        }
        self.ensure_roles_exist(&role_ids).await?;

        self.users
            .replace_roles(id, &role_ids, Some(ctx.user_id()))
            .await?;

        info!(user_id = %id, roles = role_ids.len(), assigned_by = %ctx.user_id(), "User roles replaced");
        self.get(id).await
    }

    async fn ensure_roles_exist(&self, role_ids: &[Uuid]) -> Result<(), AppError> {
        for id in role_ids {
            if self.roles.find_by_id(*id).await?.is_none() {
                return Err(AppError::validation("invalid role ids"));
            }
        }
        Ok(())
    }
}
