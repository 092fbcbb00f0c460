//! Credential store port.
//!
//! The store is the single collaborator holding user/role/permission/menu
//! records and their join links. Relationship queries return flat sets keyed
//! by id; there are no navigable object graphs.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use warden_core::{MenuItem, MenuItemId, Permission, PermissionId, Role, RoleId, User, UserId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Error raised by a credential store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (connection, query, lock). Opaque to callers.
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Persistence operations consumed by the resolver and services.
///
/// `create_*` operations assign the record identifier; the id on the input
/// value is ignored. Link insertions (`add_user_to_role`,
/// `add_permission_to_role`) are idempotent: inserting an existing pair is a
/// no-op. `update_*`/`delete_*` on a missing id is a no-op as well —
/// existence checks belong to the service layer, which runs them first.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    // ── users ────────────────────────────────────────────────────────────

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Exact-equality lookup of the opaque refresh token.
    async fn user_by_refresh_token(&self, token: &str) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, user: User) -> Result<User, StoreError>;
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    // ── user ↔ role links ────────────────────────────────────────────────

    async fn roles_for_user(&self, user: UserId) -> Result<Vec<Role>, StoreError>;
    async fn add_user_to_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError>;
    async fn remove_user_from_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError>;
    async fn users_in_role(&self, role: RoleId) -> Result<Vec<User>, StoreError>;
    /// Permissions reachable via the user's roles, deduplicated by id.
    async fn user_permissions(&self, user: UserId) -> Result<Vec<Permission>, StoreError>;

    // ── roles ────────────────────────────────────────────────────────────

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError>;
    async fn role_by_system_name(&self, system_name: &str) -> Result<Option<Role>, StoreError>;
    async fn list_roles(&self) -> Result<Vec<Role>, StoreError>;
    async fn create_role(&self, role: Role) -> Result<Role, StoreError>;
    async fn update_role(&self, role: &Role) -> Result<(), StoreError>;
    async fn delete_role(&self, id: RoleId) -> Result<(), StoreError>;

    // ── role ↔ permission links ──────────────────────────────────────────

    async fn role_permissions(&self, role: RoleId) -> Result<Vec<Permission>, StoreError>;
    async fn add_permission_to_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError>;
    async fn remove_permission_from_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError>;

    // ── permissions ──────────────────────────────────────────────────────

    async fn permission_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError>;
    async fn permission_by_system_name(
        &self,
        system_name: &str,
    ) -> Result<Option<Permission>, StoreError>;
    async fn list_permissions(&self) -> Result<Vec<Permission>, StoreError>;
    async fn permissions_by_category(&self, category: &str)
    -> Result<Vec<Permission>, StoreError>;
    async fn create_permission(&self, permission: Permission) -> Result<Permission, StoreError>;
    async fn update_permission(&self, permission: &Permission) -> Result<(), StoreError>;
    async fn delete_permission(&self, id: PermissionId) -> Result<(), StoreError>;

    // ── menu items ───────────────────────────────────────────────────────

    async fn menu_item_by_id(&self, id: MenuItemId) -> Result<Option<MenuItem>, StoreError>;
    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError>;
    async fn top_level_menu_items(&self) -> Result<Vec<MenuItem>, StoreError>;
    async fn menu_items_with_parent(
        &self,
        parent: MenuItemId,
    ) -> Result<Vec<MenuItem>, StoreError>;
    /// Visible items whose required permission is empty or granted to the role,
    /// ordered by (parent_id, display_order).
    async fn visible_menu_items_for_role(
        &self,
        role: RoleId,
    ) -> Result<Vec<MenuItem>, StoreError>;
    async fn create_menu_item(&self, item: MenuItem) -> Result<MenuItem, StoreError>;
    async fn update_menu_item(&self, item: &MenuItem) -> Result<(), StoreError>;
    async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).user_by_id(id).await
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).user_by_username(username).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).user_by_email(email).await
    }

    async fn user_by_refresh_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        (**self).user_by_refresh_token(token).await
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        (**self).create_user(user).await
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        (**self).update_user(user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        (**self).list_users().await
    }

    async fn roles_for_user(&self, user: UserId) -> Result<Vec<Role>, StoreError> {
        (**self).roles_for_user(user).await
    }

    async fn add_user_to_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError> {
        (**self).add_user_to_role(user, role).await
    }

    async fn remove_user_from_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError> {
        (**self).remove_user_from_role(user, role).await
    }

    async fn users_in_role(&self, role: RoleId) -> Result<Vec<User>, StoreError> {
        (**self).users_in_role(role).await
    }

    async fn user_permissions(&self, user: UserId) -> Result<Vec<Permission>, StoreError> {
        (**self).user_permissions(user).await
    }

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        (**self).role_by_id(id).await
    }

    async fn role_by_system_name(&self, system_name: &str) -> Result<Option<Role>, StoreError> {
        (**self).role_by_system_name(system_name).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        (**self).list_roles().await
    }

    async fn create_role(&self, role: Role) -> Result<Role, StoreError> {
        (**self).create_role(role).await
    }

    async fn update_role(&self, role: &Role) -> Result<(), StoreError> {
        (**self).update_role(role).await
    }

    async fn delete_role(&self, id: RoleId) -> Result<(), StoreError> {
        (**self).delete_role(id).await
    }

    async fn role_permissions(&self, role: RoleId) -> Result<Vec<Permission>, StoreError> {
        (**self).role_permissions(role).await
    }

    async fn add_permission_to_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError> {
        (**self).add_permission_to_role(role, permission).await
    }

    async fn remove_permission_from_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError> {
        (**self).remove_permission_from_role(role, permission).await
    }

    async fn permission_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError> {
        (**self).permission_by_id(id).await
    }

    async fn permission_by_system_name(
        &self,
        system_name: &str,
    ) -> Result<Option<Permission>, StoreError> {
        (**self).permission_by_system_name(system_name).await
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        (**self).list_permissions().await
    }

    async fn permissions_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Permission>, StoreError> {
        (**self).permissions_by_category(category).await
    }

    async fn create_permission(&self, permission: Permission) -> Result<Permission, StoreError> {
        (**self).create_permission(permission).await
    }

    async fn update_permission(&self, permission: &Permission) -> Result<(), StoreError> {
        (**self).update_permission(permission).await
    }

    async fn delete_permission(&self, id: PermissionId) -> Result<(), StoreError> {
        (**self).delete_permission(id).await
    }

    async fn menu_item_by_id(&self, id: MenuItemId) -> Result<Option<MenuItem>, StoreError> {
        (**self).menu_item_by_id(id).await
    }

    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        (**self).list_menu_items().await
    }

    async fn top_level_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        (**self).top_level_menu_items().await
    }

    async fn menu_items_with_parent(
        &self,
        parent: MenuItemId,
    ) -> Result<Vec<MenuItem>, StoreError> {
        (**self).menu_items_with_parent(parent).await
    }

    async fn visible_menu_items_for_role(
        &self,
        role: RoleId,
    ) -> Result<Vec<MenuItem>, StoreError> {
        (**self).visible_menu_items_for_role(role).await
    }

    async fn create_menu_item(&self, item: MenuItem) -> Result<MenuItem, StoreError> {
        (**self).create_menu_item(item).await
    }

    async fn update_menu_item(&self, item: &MenuItem) -> Result<(), StoreError> {
        (**self).update_menu_item(item).await
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), StoreError> {
        (**self).delete_menu_item(id).await
    }
}
