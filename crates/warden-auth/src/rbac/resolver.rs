//! Permission resolution. Pure functions, no I/O.
//!
//! Matching is exact and case-sensitive. There are no wildcards and no role
//! hierarchy: a principal has what its roles carry and nothing more.

use warden_entity::user::Principal;

/// Whether any of the principal's roles carries `(resource, action)`.
pub fn has_permission(principal: &Principal, resource: &str, action: &str) -> bool {
    principal
        .roles
        .iter()
        .flat_map(|role| role.permissions.iter())
        .any(|permission| permission.grants(resource, action))
}

/// Whether the principal holds a role named exactly `role_name`.
pub fn has_role(principal: &Principal, role_name: &str) -> bool {
    principal.role_names().any(|name| name == role_name)
}

/// Whether the principal holds at least one of `role_names`.
pub fn has_any_role(principal: &Principal, role_names: &[&str]) -> bool {
    role_names.iter().any(|name| has_role(principal, name))
}
