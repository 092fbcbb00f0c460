//! In-memory credential store for tests and single-process dev wiring.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use warden_core::{MenuItem, MenuItemId, Permission, PermissionId, Role, RoleId, User, UserId};

use super::{CredentialStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    menu_items: HashMap<MenuItemId, MenuItem>,
    user_roles: HashSet<(UserId, RoleId)>,
    role_permissions: HashSet<(RoleId, PermissionId)>,
    next_user_id: i64,
    next_role_id: i64,
    next_permission_id: i64,
    next_menu_item_id: i64,
}

/// In-memory store backed by `RwLock<HashMap>` tables.
///
/// Identifiers are assigned from per-table counters. List results are sorted
/// by id so reads are deterministic.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Tables>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the built-in system roles.
    pub fn with_system_roles() -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.inner.write() {
            for (name, system_name, description) in [
                ("Administrator", "Administrator", "Full administrative access"),
                ("Student", "Student", "Default role for new registrations"),
            ] {
                tables.next_role_id += 1;
                let id = RoleId::from_i64(tables.next_role_id);
                tables.roles.insert(
                    id,
                    Role {
                        id,
                        name: name.to_string(),
                        system_name: system_name.to_string(),
                        description: description.to_string(),
                        is_system_role: true,
                    },
                );
            }
        }
        store
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend("store lock poisoned"))
    }
}

fn sorted_by_id<T, K: Ord>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort_by_key(key);
    out
}

fn menu_order(items: impl Iterator<Item = MenuItem>) -> Vec<MenuItem> {
    let mut out: Vec<MenuItem> = items.collect();
    out.sort_by_key(|m| (m.parent_id, m.display_order, m.id));
    out
}

fn role_permission_names(tables: &Tables, role: RoleId) -> HashSet<String> {
    tables
        .role_permissions
        .iter()
        .filter(|(r, _)| *r == role)
        .filter_map(|(_, p)| tables.permissions.get(p))
        .map(|p| p.system_name.clone())
        .collect()
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn user_by_refresh_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.refresh_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create_user(&self, mut user: User) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        tables.next_user_id += 1;
        user.id = UserId::from_i64(tables.next_user_id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.users.contains_key(&user.id) {
            tables.users.insert(user.id, user.clone());
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(sorted_by_id(self.read()?.users.values().cloned(), |u| u.id))
    }

    async fn roles_for_user(&self, user: UserId) -> Result<Vec<Role>, StoreError> {
        let tables = self.read()?;
        let roles = tables
            .user_roles
            .iter()
            .filter(|(u, _)| *u == user)
            .filter_map(|(_, r)| tables.roles.get(r))
            .cloned();
        Ok(sorted_by_id(roles, |r| r.id))
    }

    async fn add_user_to_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError> {
        self.write()?.user_roles.insert((user, role));
        Ok(())
    }

    async fn remove_user_from_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError> {
        self.write()?.user_roles.remove(&(user, role));
        Ok(())
    }

    async fn users_in_role(&self, role: RoleId) -> Result<Vec<User>, StoreError> {
        let tables = self.read()?;
        let users = tables
            .user_roles
            .iter()
            .filter(|(_, r)| *r == role)
            .filter_map(|(u, _)| tables.users.get(u))
            .cloned();
        Ok(sorted_by_id(users, |u| u.id))
    }

    async fn user_permissions(&self, user: UserId) -> Result<Vec<Permission>, StoreError> {
        let tables = self.read()?;
        let role_ids: HashSet<RoleId> = tables
            .user_roles
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, r)| *r)
            .collect();
        let permission_ids: HashSet<PermissionId> = tables
            .role_permissions
            .iter()
            .filter(|(r, _)| role_ids.contains(r))
            .map(|(_, p)| *p)
            .collect();
        let perms = permission_ids
            .into_iter()
            .filter_map(|p| tables.permissions.get(&p))
            .cloned();
        Ok(sorted_by_id(perms, |p| p.id))
    }

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    async fn role_by_system_name(&self, system_name: &str) -> Result<Option<Role>, StoreError> {
        Ok(self
            .read()?
            .roles
            .values()
            .find(|r| r.system_name == system_name)
            .cloned())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(sorted_by_id(self.read()?.roles.values().cloned(), |r| r.id))
    }

    async fn create_role(&self, mut role: Role) -> Result<Role, StoreError> {
        let mut tables = self.write()?;
        tables.next_role_id += 1;
        role.id = RoleId::from_i64(tables.next_role_id);
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, role: &Role) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.roles.contains_key(&role.id) {
            tables.roles.insert(role.id, role.clone());
        }
        Ok(())
    }

    async fn delete_role(&self, id: RoleId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.roles.remove(&id);
        tables.user_roles.retain(|(_, r)| *r != id);
        tables.role_permissions.retain(|(r, _)| *r != id);
        Ok(())
    }

    async fn role_permissions(&self, role: RoleId) -> Result<Vec<Permission>, StoreError> {
        let tables = self.read()?;
        let perms = tables
            .role_permissions
            .iter()
            .filter(|(r, _)| *r == role)
            .filter_map(|(_, p)| tables.permissions.get(p))
            .cloned();
        Ok(sorted_by_id(perms, |p| p.id))
    }

    async fn add_permission_to_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError> {
        self.write()?.role_permissions.insert((role, permission));
        Ok(())
    }

    async fn remove_permission_from_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError> {
        self.write()?.role_permissions.remove(&(role, permission));
        Ok(())
    }

    async fn permission_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError> {
        Ok(self.read()?.permissions.get(&id).cloned())
    }

    async fn permission_by_system_name(
        &self,
        system_name: &str,
    ) -> Result<Option<Permission>, StoreError> {
        Ok(self
            .read()?
            .permissions
            .values()
            .find(|p| p.system_name == system_name)
            .cloned())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        Ok(sorted_by_id(
            self.read()?.permissions.values().cloned(),
            |p| p.id,
        ))
    }

    async fn permissions_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Permission>, StoreError> {
        let tables = self.read()?;
        let perms = tables
            .permissions
            .values()
            .filter(|p| p.category == category)
            .cloned();
        Ok(sorted_by_id(perms, |p| p.id))
    }

    async fn create_permission(&self, mut permission: Permission) -> Result<Permission, StoreError> {
        let mut tables = self.write()?;
        tables.next_permission_id += 1;
        permission.id = PermissionId::from_i64(tables.next_permission_id);
        tables.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn update_permission(&self, permission: &Permission) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.permissions.contains_key(&permission.id) {
            tables.permissions.insert(permission.id, permission.clone());
        }
        Ok(())
    }

    async fn delete_permission(&self, id: PermissionId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.permissions.remove(&id);
        tables.role_permissions.retain(|(_, p)| *p != id);
        Ok(())
    }

    async fn menu_item_by_id(&self, id: MenuItemId) -> Result<Option<MenuItem>, StoreError> {
        Ok(self.read()?.menu_items.get(&id).cloned())
    }

    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        Ok(sorted_by_id(
            self.read()?.menu_items.values().cloned(),
            |m| m.id,
        ))
    }

    async fn top_level_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        let tables = self.read()?;
        let items = tables
            .menu_items
            .values()
            .filter(|m| m.is_top_level() && m.is_visible)
            .cloned();
        Ok(menu_order(items))
    }

    async fn menu_items_with_parent(
        &self,
        parent: MenuItemId,
    ) -> Result<Vec<MenuItem>, StoreError> {
        let tables = self.read()?;
        let items = tables
            .menu_items
            .values()
            .filter(|m| m.parent_id == parent && m.is_visible)
            .cloned();
        Ok(menu_order(items))
    }

    async fn visible_menu_items_for_role(
        &self,
        role: RoleId,
    ) -> Result<Vec<MenuItem>, StoreError> {
        let tables = self.read()?;
        let granted = role_permission_names(&tables, role);
        let items = tables
            .menu_items
            .values()
            .filter(|m| {
                m.is_visible
                    && (m.required_permission.is_empty()
                        || granted.contains(&m.required_permission))
            })
            .cloned();
        Ok(menu_order(items))
    }

    async fn create_menu_item(&self, mut item: MenuItem) -> Result<MenuItem, StoreError> {
        let mut tables = self.write()?;
        tables.next_menu_item_id += 1;
        item.id = MenuItemId::from_i64(tables.next_menu_item_id);
        tables.menu_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_menu_item(&self, item: &MenuItem) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.menu_items.contains_key(&item.id) {
            tables.menu_items.insert(item.id, item.clone());
        }
        Ok(())
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), StoreError> {
        self.write()?.menu_items.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(system_name: &str) -> Permission {
        Permission {
            id: PermissionId::from_i64(0),
            name: system_name.to_string(),
            system_name: system_name.to_string(),
            description: String::new(),
            category: "test".to_string(),
            action: "view".to_string(),
            resource: "test".to_string(),
        }
    }

    fn role(system_name: &str) -> Role {
        Role {
            id: RoleId::from_i64(0),
            name: system_name.to_string(),
            system_name: system_name.to_string(),
            description: String::new(),
            is_system_role: false,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryCredentialStore::new();
        let a = store.create_role(role("a")).await.unwrap();
        let b = store.create_role(role("b")).await.unwrap();
        assert!(b.id.as_i64() > a.id.as_i64());
    }

    #[tokio::test]
    async fn link_insertion_is_idempotent() {
        let store = MemoryCredentialStore::new();
        let r = store.create_role(role("r")).await.unwrap();
        let p = store.create_permission(permission("x.view")).await.unwrap();

        store.add_permission_to_role(r.id, p.id).await.unwrap();
        store.add_permission_to_role(r.id, p.id).await.unwrap();

        assert_eq!(store.role_permissions(r.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn user_permissions_dedup_across_roles() {
        let store = MemoryCredentialStore::new();
        let shared = store.create_permission(permission("shared.view")).await.unwrap();
        let only_a = store.create_permission(permission("a.view")).await.unwrap();

        let role_a = store.create_role(role("a")).await.unwrap();
        let role_b = store.create_role(role("b")).await.unwrap();
        store.add_permission_to_role(role_a.id, shared.id).await.unwrap();
        store.add_permission_to_role(role_a.id, only_a.id).await.unwrap();
        store.add_permission_to_role(role_b.id, shared.id).await.unwrap();

        let user = store
            .create_user(User {
                id: UserId::from_i64(0),
                username: "u".to_string(),
                email: "u@example.com".to_string(),
                password_hash: String::new(),
                is_active: true,
                email_confirmed: true,
                email_verification_token: None,
                email_verification_token_expiry: None,
                password_reset_token: None,
                password_reset_token_expiry: None,
                refresh_token: None,
                refresh_token_expiry: None,
            })
            .await
            .unwrap();
        store.add_user_to_role(user.id, role_a.id).await.unwrap();
        store.add_user_to_role(user.id, role_b.id).await.unwrap();

        let perms = store.user_permissions(user.id).await.unwrap();
        assert_eq!(perms.len(), 2);
    }

    #[tokio::test]
    async fn deleting_role_removes_its_links() {
        let store = MemoryCredentialStore::new();
        let r = store.create_role(role("r")).await.unwrap();
        let p = store.create_permission(permission("x.view")).await.unwrap();
        store.add_permission_to_role(r.id, p.id).await.unwrap();

        store.delete_role(r.id).await.unwrap();

        assert!(store.role_by_id(r.id).await.unwrap().is_none());
        assert!(store.role_permissions(r.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn system_roles_are_seeded() {
        let store = MemoryCredentialStore::with_system_roles();
        let admin = store.role_by_system_name("Administrator").await.unwrap();
        let student = store.role_by_system_name("Student").await.unwrap();
        assert!(admin.is_some_and(|r| r.is_system_role));
        assert!(student.is_some_and(|r| r.is_system_role));
    }
}
