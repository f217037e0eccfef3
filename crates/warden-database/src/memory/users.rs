use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{PageRequest, PageResponse};
use warden_entity::role::RoleWithPermissions;
use warden_entity::user::{CreateUser, UpdateUser, User, UserFilter};

use super::{Assignment, MemoryStore};
use crate::store::UserStore;

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|u| u.username == data.username || u.email == data.email)
        {
            return Err(AppError::conflict("username or email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_login(&self, identifier: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn exists_by_username_or_email(&self, username: &str, email: &str) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        if let Some(email) = &data.email {
            if state.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(AppError::conflict("email already exists"));
            }
        }
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        data.apply_to(user, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let removed = state.users.remove(&id).is_some();
        state.assignments.retain(|a| a.user_id != id);
        state.refresh_tokens.retain(|_, t| t.user_id != id);
        Ok(removed)
    }

    async fn roles_for(&self, user_id: Uuid) -> AppResult<Vec<RoleWithPermissions>> {
        let state = self.state.lock().await;
        let mut roles: Vec<RoleWithPermissions> = state
            .assignments
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| state.roles.get(&a.role_id))
            .map(|role| state.with_permissions(role))
            .collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(roles)
    }

    async fn assign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        _assigned_by: Option<Uuid>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&user_id) || !state.roles.contains_key(&role_id) {
            return Err(AppError::not_found("user or role not found"));
        }
        let held = state
            .assignments
            .iter()
            .any(|a| a.user_id == user_id && a.role_id == role_id);
        if !held {
            state.assignments.push(Assignment { user_id, role_id });
        }
        Ok(())
    }

    async fn replace_roles(
        &self,
        user_id: Uuid,
        role_ids: &[Uuid],
        _assigned_by: Option<Uuid>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if role_ids.iter().any(|id| !state.roles.contains_key(id)) {
            return Err(AppError::not_found("role not found"));
        }
        state.assignments.retain(|a| a.user_id != user_id);
        for role_id in role_ids {
            if !state
                .assignments
                .iter()
                .any(|a| a.user_id == user_id && a.role_id == *role_id)
            {
                state.assignments.push(Assignment {
                    user_id,
                    role_id: *role_id,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RoleStore;
    use warden_entity::role::CreateRole;

    fn new_user(name: &str) -> CreateUser {
        CreateUser {
            username: name.to_string(),
            email: format!("{name}@x.com"),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("alice")).await.unwrap();
        let err = UserStore::create(&store, new_user("alice")).await.unwrap_err();
        assert_eq!(err.kind, warden_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_find_by_login_accepts_username_or_email() {
        let store = MemoryStore::new();
        let alice = UserStore::create(&store, new_user("alice")).await.unwrap();
        let by_name = store.find_by_login("alice").await.unwrap().unwrap();
        let by_email = store.find_by_login("alice@x.com").await.unwrap().unwrap();
        assert_eq!(by_name.id, alice.id);
        assert_eq!(by_email.id, alice.id);
        assert!(store.find_by_login("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_principal_includes_assigned_roles() {
        let store = MemoryStore::new();
        let alice = UserStore::create(&store, new_user("alice")).await.unwrap();
        let role = RoleStore::create(
            &store,
            CreateRole {
                name: "admin".to_string(),
                description: String::new(),
                permission_ids: vec![],
            },
        )
        .await
        .unwrap();

        store.assign_role(alice.id, role.role.id, None).await.unwrap();
        store.assign_role(alice.id, role.role.id, None).await.unwrap();

        let principal = store.load_principal(alice.id).await.unwrap().unwrap();
        assert_eq!(principal.role_names().collect::<Vec<_>>(), vec!["admin"]);
    }

    #[tokio::test]
    async fn test_list_applies_filter_before_paging() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("alice")).await.unwrap();
        UserStore::create(&store, new_user("Alicia")).await.unwrap();
        let bob = UserStore::create(&store, new_user("bob")).await.unwrap();
        UserStore::update(
            &store,
            bob.id,
            &UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let search = UserFilter {
            search: Some("ALI".to_string()),
            ..Default::default()
        };
        let page = UserStore::list(&store, &search, PageRequest::new(1, 1)).await.unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items.len(), 1);

        let inactive = UserFilter {
            active: Some(false),
            ..Default::default()
        };
        let page = UserStore::list(&store, &inactive, PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, bob.id);
    }
}
