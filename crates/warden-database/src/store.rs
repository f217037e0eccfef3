//! Store traits consumed by the auth and service layers.
//!
//! Every trait is object safe and used behind `Arc<dyn ...>`. Time-dependent
//! queries take `now` explicitly so callers own the clock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::AppResult;
use warden_core::types::{PageRequest, PageResponse};
use warden_entity::permission::{CreatePermission, Permission, UpdatePermission};
use warden_entity::role::{CreateRole, Role, RoleWithPermissions, UpdateRole};
use warden_entity::security::{
    CreateRequestLog, FailedLoginAttempt, FailedLoginRecord, RequestLog,
};
use warden_entity::token::{CreateRefreshToken, RefreshToken};
use warden_entity::user::{CreateUser, Principal, UpdateUser, User, UserFilter};

use crate::memory::MemoryStore;
use crate::repositories::{
    FailedLoginRepository, PermissionRepository, RefreshTokenRepository, RequestLogRepository,
    RoleRepository, UserRepository,
};

/// Users and their role assignments.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert a new user. Duplicate username or email is a conflict.
    async fn create(&self, data: CreateUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user whose username or email equals `identifier`.
    async fn find_by_login(&self, identifier: &str) -> AppResult<Option<User>>;

    /// Whether any user already holds this username or email.
    async fn exists_by_username_or_email(&self, username: &str, email: &str) -> AppResult<bool>;

    /// List users matching `filter`, newest first.
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> AppResult<PageResponse<User>>;

    /// Apply a partial update. Returns `None` if the user does not exist.
    async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<Option<User>>;

    /// Delete a user and its role assignments and refresh tokens.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Roles assigned to a user, with their permissions.
    async fn roles_for(&self, user_id: Uuid) -> AppResult<Vec<RoleWithPermissions>>;

    /// Add one role to a user. Assigning an already-held role is a no-op.
    async fn assign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        assigned_by: Option<Uuid>,
    ) -> AppResult<()>;

    /// Replace the user's role set atomically.
    async fn replace_roles(
        &self,
        user_id: Uuid,
        role_ids: &[Uuid],
        assigned_by: Option<Uuid>,
    ) -> AppResult<()>;

    /// Load the user with roles and permissions in one value.
    async fn load_principal(&self, id: Uuid) -> AppResult<Option<Principal>> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let roles = self.roles_for(id).await?;
        Ok(Some(Principal::new(user, roles)))
    }
}

/// Roles and their permission sets.
#[async_trait]
pub trait RoleStore: Send + Sync + 'static {
    /// Insert a role with its permissions. Duplicate name is a conflict.
    async fn create(&self, data: CreateRole) -> AppResult<RoleWithPermissions>;

    /// Find a role by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoleWithPermissions>>;

    /// Find a role by exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// All roles ordered by name.
    async fn list(&self) -> AppResult<Vec<RoleWithPermissions>>;

    /// Apply a partial update. Returns `None` if the role does not exist.
    async fn update(&self, id: Uuid, data: &UpdateRole) -> AppResult<Option<RoleWithPermissions>>;

    /// Delete a role.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Number of users holding the role.
    async fn count_members(&self, role_id: Uuid) -> AppResult<u64>;
}

/// The permission catalogue.
#[async_trait]
pub trait PermissionStore: Send + Sync + 'static {
    /// Insert a permission. Duplicate name or `(resource, action)` is a conflict.
    async fn create(&self, data: CreatePermission) -> AppResult<Permission>;

    /// Find a permission by exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// Find a permission by its `(resource, action)` pair.
    async fn find_by_resource_action(
        &self,
        resource: &str,
        action: &str,
    ) -> AppResult<Option<Permission>>;

    /// Permissions with the given ids; unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Permission>>;

    /// All permissions ordered by resource then action.
    async fn list(&self) -> AppResult<Vec<Permission>>;

    /// Apply a partial update. Returns `None` if the permission does not exist.
    async fn update(&self, id: Uuid, data: &UpdatePermission) -> AppResult<Option<Permission>>;

    /// Delete a permission that no role grants.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Number of roles granting the permission.
    async fn count_roles(&self, permission_id: Uuid) -> AppResult<u64>;
}

/// Persisted refresh tokens, addressed by the SHA-256 digest of the token.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Persist a newly issued token as active.
    async fn create(&self, data: CreateRefreshToken) -> AppResult<RefreshToken>;

    /// The token with this digest if it is active and expires after `now`.
    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RefreshToken>>;

    /// Mark one token inactive. Returns the number of rows that changed.
    async fn deactivate(&self, token_hash: &str) -> AppResult<u64>;

    /// Mark every token of a user inactive. Returns the number of rows that changed.
    async fn deactivate_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Active, unexpired tokens held by a user.
    async fn count_active_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Delete tokens that are inactive or expired at `now`.
    async fn purge(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Failed login counters keyed by source address.
#[async_trait]
pub trait FailedLoginStore: Send + Sync + 'static {
    /// Upsert the record for the attempt's address, incrementing its counter.
    async fn record_failure(
        &self,
        attempt: &FailedLoginAttempt,
        now: DateTime<Utc>,
    ) -> AppResult<FailedLoginRecord>;

    /// Records ordered by most recent attempt.
    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<FailedLoginRecord>>;
}

/// Append-only request audit log.
#[async_trait]
pub trait RequestLogStore: Send + Sync + 'static {
    /// Append one entry.
    async fn append(&self, entry: CreateRequestLog) -> AppResult<()>;

    /// Most recent entries first.
    async fn recent(&self, limit: u64) -> AppResult<Vec<RequestLog>>;
}

/// Handles to every store, shared by the auth, service, and API layers.
#[derive(Clone)]
pub struct Stores {
    /// Users and role assignments.
    pub users: Arc<dyn UserStore>,
    /// Roles.
    pub roles: Arc<dyn RoleStore>,
    /// Permissions.
    pub permissions: Arc<dyn PermissionStore>,
    /// Refresh tokens.
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    /// Failed login counters.
    pub failed_logins: Arc<dyn FailedLoginStore>,
    /// Request audit log.
    pub request_logs: Arc<dyn RequestLogStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            permissions: Arc::new(PermissionRepository::new(pool.clone())),
            refresh_tokens: Arc::new(RefreshTokenRepository::new(pool.clone())),
            failed_logins: Arc::new(FailedLoginRepository::new(pool.clone())),
            request_logs: Arc::new(RequestLogRepository::new(pool)),
        }
    }

    /// Stores backed by one shared in-memory state.
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            roles: Arc::new(store.clone()),
            permissions: Arc::new(store.clone()),
            refresh_tokens: Arc::new(store.clone()),
            failed_logins: Arc::new(store.clone()),
            request_logs: Arc::new(store),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
