//! Role domain entities.

pub mod model;

pub use model::{CreateRole, DEFAULT_ROLES, Role, RoleWithPermissions, UpdateRole};
