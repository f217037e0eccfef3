//! # warden-service
//!
//! Application use cases for Warden. Each service receives its store
//! handles and auth components at construction time and operates on a
//! typed [`RequestContext`] for the acting principal.

pub mod auth;
pub mod context;
pub mod permission;
pub mod role;
pub mod security;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthService, AuthSession, LoginInput, RegisterInput};
pub use context::{ClientInfo, RequestContext};
pub use permission::PermissionService;
pub use role::RoleService;
pub use security::SecurityService;
pub use user::{CreateUserInput, UserAdminService};
