//! Idempotent seeding of the default permissions and roles.

use tracing::info;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::permission::CreatePermission;
use warden_entity::role::{CreateRole, UpdateRole};

use crate::store::Stores;

/// `(resource, action, description)` for every built-in permission.
const DEFAULT_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("users", "read", "Read users"),
    ("users", "write", "Write users"),
    ("users", "delete", "Delete users"),
    ("roles", "read", "Read roles"),
    ("roles", "write", "Write roles"),
    ("roles", "delete", "Delete roles"),
    ("permissions", "read", "Read permissions"),
    ("permissions", "write", "Write permissions"),
    ("permissions", "delete", "Delete permissions"),
];

/// Built-in roles and the permission names they carry. `*` means all.
const DEFAULT_ROLE_GRANTS: &[(&str, &str, &[&str])] = &[
    ("admin", "Administrator with full system access", &["*"]),
    (
        "moderator",
        "Read access to users, roles, and permissions",
        &["users.read", "roles.read", "permissions.read"],
    ),
    ("user", "Regular user", &[]),
];

/// Insert missing default permissions and roles.
///
/// Existing rows are left untouched, except that a permission created by this
/// run is also granted to existing default roles whose grants cover it.
pub async fn seed_defaults(stores: &Stores) -> AppResult<()> {
    let mut catalogue: Vec<(String, Uuid)> = Vec::with_capacity(DEFAULT_PERMISSIONS.len());
    let mut created: Vec<Uuid> = Vec::new();
    for (resource, action, description) in DEFAULT_PERMISSIONS {
        let name = format!("{resource}.{action}");
        let permission = match stores.permissions.find_by_name(&name).await? {
            Some(existing) => existing,
            None => {
                info!(permission = %name, "Seeding permission");
                let permission = stores
                    .permissions
                    .create(CreatePermission {
                        name: name.clone(),
                        resource: resource.to_string(),
                        action: action.to_string(),
                        description: description.to_string(),
                    })
                    .await?;
                created.push(permission.id);
                permission
            }
        };
        catalogue.push((name, permission.id));
    }

    for (name, description, grants) in DEFAULT_ROLE_GRANTS {
        let permission_ids: Vec<Uuid> = catalogue
            .iter()
            .filter(|(perm, _)| grants.contains(&"*") || grants.contains(&perm.as_str()))
            .map(|(_, id)| *id)
            .collect();

        if let Some(existing) = stores.roles.find_by_name(name).await? {
            grant_new_permissions(stores, existing.id, &permission_ids, &created).await?;
            continue;
        }
        info!(role = %name, "Seeding role");
        stores
            .roles
            .create(CreateRole {
                name: name.to_string(),
                description: description.to_string(),
                permission_ids,
            })
            .await?;
    }

    Ok(())
}

async fn grant_new_permissions(
    stores: &Stores,
    role_id: Uuid,
    covered: &[Uuid],
    created: &[Uuid],
) -> AppResult<()> {
    let fresh: Vec<Uuid> = covered
        .iter()
        .filter(|id| created.contains(id))
        .copied()
        .collect();
    if fresh.is_empty() {
        return Ok(());
    }
    let Some(role) = stores.roles.find_by_id(role_id).await? else {
        return Ok(());
    };
    let mut permission_ids: Vec<Uuid> = role.permissions.iter().map(|p| p.id).collect();
    permission_ids.extend(fresh);
    info!(role = %role.role.name, "Granting newly seeded permissions");
    stores
        .roles
        .update(
            role_id,
            &UpdateRole {
                permission_ids: Some(permission_ids),
                ..UpdateRole::default()
            },
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let stores = Stores::memory(MemoryStore::new());
        seed_defaults(&stores).await.unwrap();
        seed_defaults(&stores).await.unwrap();

        let roles = stores.roles.list().await.unwrap();
        assert_eq!(roles.len(), 3);
        assert_eq!(stores.permissions.list().await.unwrap().len(), 9);

        let admin = roles.iter().find(|r| r.role.name == "admin").unwrap();
        assert_eq!(admin.permissions.len(), 9);
        let user = roles.iter().find(|r| r.role.name == "user").unwrap();
        assert!(user.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_new_permissions_reach_existing_admin_role() {
        let stores = Stores::memory(MemoryStore::new());
        stores
            .roles
            .create(CreateRole {
                name: "admin".to_string(),
                description: "pre-existing".to_string(),
                permission_ids: Vec::new(),
            })
            .await
            .unwrap();

        seed_defaults(&stores).await.unwrap();

        let admin = stores.roles.find_by_name("admin").await.unwrap().unwrap();
        let admin = stores.roles.find_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(admin.role.description, "pre-existing");
        assert!(admin.permissions.iter().any(|p| p.name == "permissions.delete"));
        assert_eq!(admin.permissions.len(), 9);
    }
}
