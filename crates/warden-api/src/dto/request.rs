//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use warden_entity::permission::{CreatePermission, UpdatePermission};
use warden_entity::role::{CreateRole, UpdateRole};
use warden_entity::user::UpdateUser;
use warden_service::{CreateUserInput, LoginInput, RegisterInput};

/// Self-registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 50, message = "username must be 3 to 50 characters"))]
    pub username: String,
    /// Email.
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    /// Password; the length policy is enforced by the service.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Login body. `username` also accepts an email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(alias = "identifier", alias = "email")]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(req: LoginRequest) -> Self {
        Self {
            identifier: req.username,
            password: req.password,
        }
    }
}

/// Token refresh body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Logout body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogoutRequest {
    /// Refresh token to revoke.
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Admin user creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username.
    #[validate(length(min = 3, max = 50, message = "username must be 3 to 50 characters"))]
    pub username: String,
    /// Email.
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    /// Initial password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Initial roles; empty means the default role.
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role_ids: req.role_ids,
        }
    }
}

/// Admin user update body. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email.
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// Enable or disable the account.
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            is_active: req.is_active,
        }
    }
}

/// Role set replacement body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignRolesRequest {
    /// The complete new role set.
    pub role_ids: Vec<Uuid>,
}

/// Role creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoleRequest {
    /// Unique name.
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Permissions to attach.
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

impl From<CreateRoleRequest> for CreateRole {
    fn from(req: CreateRoleRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            permission_ids: req.permission_ids,
        }
    }
}

/// Role update body. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    /// New name.
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement permission set.
    pub permission_ids: Option<Vec<Uuid>>,
}

impl From<UpdateRoleRequest> for UpdateRole {
    fn from(req: UpdateRoleRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            permission_ids: req.permission_ids,
        }
    }
}

/// Permission creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    /// Unique name, conventionally `resource.action`.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Resource.
    #[validate(length(min = 1, max = 50))]
    pub resource: String,
    /// Action.
    #[validate(length(min = 1, max = 50))]
    pub action: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl From<CreatePermissionRequest> for CreatePermission {
    fn from(req: CreatePermissionRequest) -> Self {
        Self {
            name: req.name,
            resource: req.resource,
            action: req.action,
            description: req.description,
        }
    }
}

/// Permission update body. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePermissionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub resource: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub action: Option<String>,
    pub description: Option<String>,
}

impl From<UpdatePermissionRequest> for UpdatePermission {
    fn from(req: UpdatePermissionRequest) -> Self {
        Self {
            name: req.name,
            resource: req.resource,
            action: req.action,
            description: req.description,
        }
    }
}
