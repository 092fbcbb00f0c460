//! Postgres-backed credential store.
//!
//! Schema management is out of scope here; the store expects the tables
//! `users`, `roles`, `permissions`, `user_roles`, `role_permissions`, and
//! `menu_items` to exist, with composite primary keys on the two join
//! tables (that is what makes the `ON CONFLICT DO NOTHING` link inserts
//! idempotent).
//!
//! ## Thread safety
//!
//! All operations go through the SQLx connection pool, which is `Send +
//! Sync`; the store can be shared freely across request tasks.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use async_trait::async_trait;

use warden_core::{MenuItem, MenuItemId, Permission, PermissionId, Role, RoleId, User, UserId};

use super::{CredentialStore, StoreError};

/// Credential store over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: Arc<PgPool>,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::backend(format!("{operation}: {err}"))
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::from_i64(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
        email_confirmed: row.try_get("email_confirmed")?,
        email_verification_token: row.try_get("email_verification_token")?,
        email_verification_token_expiry: row.try_get("email_verification_token_expiry")?,
        password_reset_token: row.try_get("password_reset_token")?,
        password_reset_token_expiry: row.try_get("password_reset_token_expiry")?,
        refresh_token: row.try_get("refresh_token")?,
        refresh_token_expiry: row.try_get("refresh_token_expiry")?,
    })
}

fn role_from_row(row: &PgRow) -> Result<Role, sqlx::Error> {
    Ok(Role {
        id: RoleId::from_i64(row.try_get("id")?),
        name: row.try_get("name")?,
        system_name: row.try_get("system_name")?,
        description: row.try_get("description")?,
        is_system_role: row.try_get("is_system_role")?,
    })
}

fn permission_from_row(row: &PgRow) -> Result<Permission, sqlx::Error> {
    Ok(Permission {
        id: PermissionId::from_i64(row.try_get("id")?),
        name: row.try_get("name")?,
        system_name: row.try_get("system_name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        action: row.try_get("action")?,
        resource: row.try_get("resource")?,
    })
}

fn menu_item_from_row(row: &PgRow) -> Result<MenuItem, sqlx::Error> {
    Ok(MenuItem {
        id: MenuItemId::from_i64(row.try_get("id")?),
        name: row.try_get("name")?,
        display_name: row.try_get("display_name")?,
        url: row.try_get("url")?,
        icon: row.try_get("icon")?,
        parent_id: MenuItemId::from_i64(row.try_get("parent_id")?),
        display_order: row.try_get("display_order")?,
        is_visible: row.try_get("is_visible")?,
        required_permission: row.try_get("required_permission")?,
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, email_confirmed, \
     email_verification_token, email_verification_token_expiry, \
     password_reset_token, password_reset_token_expiry, \
     refresh_token, refresh_token_expiry";

const MENU_COLUMNS: &str =
    "id, name, display_name, url, icon, parent_id, display_order, is_visible, required_permission";

impl PgCredentialStore {
    async fn fetch_user(&self, operation: &str, sql: String, bind: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&sql)
            .bind(bind)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    #[instrument(skip(self), err)]
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_by_id", e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("user_by_id", e))
    }

    #[instrument(skip(self), err)]
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user(
            "user_by_username",
            format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"),
            username,
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user(
            "user_by_email",
            format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"),
            email,
        )
        .await
    }

    #[instrument(skip(self, token), err)]
    async fn user_by_refresh_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user(
            "user_by_refresh_token",
            format!("SELECT {USER_COLUMNS} FROM users WHERE refresh_token = $1"),
            token,
        )
        .await
    }

    #[instrument(skip(self, user), err)]
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, password_hash, is_active, email_confirmed, \
             email_verification_token, email_verification_token_expiry, \
             password_reset_token, password_reset_token_expiry, \
             refresh_token, refresh_token_expiry) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.email_confirmed)
        .bind(&user.email_verification_token)
        .bind(user.email_verification_token_expiry)
        .bind(&user.password_reset_token)
        .bind(user.password_reset_token_expiry)
        .bind(&user.refresh_token)
        .bind(user.refresh_token_expiry)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;
        user_from_row(&row).map_err(|e| map_sqlx_error("create_user", e))
    }

    #[instrument(skip(self, user), err)]
    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, is_active = $5, \
             email_confirmed = $6, email_verification_token = $7, \
             email_verification_token_expiry = $8, password_reset_token = $9, \
             password_reset_token_expiry = $10, refresh_token = $11, \
             refresh_token_expiry = $12 WHERE id = $1",
        )
        .bind(user.id.as_i64())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.email_confirmed)
        .bind(&user.email_verification_token)
        .bind(user.email_verification_token_expiry)
        .bind(&user.password_reset_token)
        .bind(user.password_reset_token_expiry)
        .bind(&user.refresh_token)
        .bind(user.refresh_token_expiry)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_users", e))
    }

    #[instrument(skip(self), err)]
    async fn roles_for_user(&self, user: UserId) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query(
            "SELECT r.id, r.name, r.system_name, r.description, r.is_system_role \
             FROM roles r JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.id",
        )
        .bind(user.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("roles_for_user", e))?;
        rows.iter()
            .map(role_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("roles_for_user", e))
    }

    #[instrument(skip(self), err)]
    async fn add_user_to_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user.as_i64())
        .bind(role.as_i64())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_user_to_role", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn remove_user_from_role(&self, user: UserId, role: RoleId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user.as_i64())
            .bind(role.as_i64())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_user_from_role", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn users_in_role(&self, role: RoleId) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE id IN (SELECT user_id FROM user_roles WHERE role_id = $1) ORDER BY id"
        ))
        .bind(role.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users_in_role", e))?;
        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("users_in_role", e))
    }

    #[instrument(skip(self), err)]
    async fn user_permissions(&self, user: UserId) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT p.id, p.name, p.system_name, p.description, p.category, \
             p.action, p.resource \
             FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             JOIN user_roles ur ON ur.role_id = rp.role_id \
             WHERE ur.user_id = $1 ORDER BY p.id",
        )
        .bind(user.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_permissions", e))?;
        rows.iter()
            .map(permission_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("user_permissions", e))
    }

    #[instrument(skip(self), err)]
    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query("SELECT * FROM roles WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_by_id", e))?;
        row.as_ref()
            .map(role_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("role_by_id", e))
    }

    #[instrument(skip(self), err)]
    async fn role_by_system_name(&self, system_name: &str) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query("SELECT * FROM roles WHERE system_name = $1")
            .bind(system_name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_by_system_name", e))?;
        row.as_ref()
            .map(role_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("role_by_system_name", e))
    }

    #[instrument(skip(self), err)]
    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query("SELECT * FROM roles ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_roles", e))?;
        rows.iter()
            .map(role_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_roles", e))
    }

    #[instrument(skip(self, role), err)]
    async fn create_role(&self, role: Role) -> Result<Role, StoreError> {
        let row = sqlx::query(
            "INSERT INTO roles (name, system_name, description, is_system_role) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&role.name)
        .bind(&role.system_name)
        .bind(&role.description)
        .bind(role.is_system_role)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_role", e))?;
        role_from_row(&row).map_err(|e| map_sqlx_error("create_role", e))
    }

    #[instrument(skip(self, role), err)]
    async fn update_role(&self, role: &Role) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE roles SET name = $2, system_name = $3, description = $4, \
             is_system_role = $5 WHERE id = $1",
        )
        .bind(role.id.as_i64())
        .bind(&role.name)
        .bind(&role.system_name)
        .bind(&role.description)
        .bind(role.is_system_role)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_role", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_role(&self, id: RoleId) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_role", e))?;
        sqlx::query("DELETE FROM user_roles WHERE role_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_role", e))?;
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_role", e))?;
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_role", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_role", e))
    }

    #[instrument(skip(self), err)]
    async fn role_permissions(&self, role: RoleId) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query(
            "SELECT p.id, p.name, p.system_name, p.description, p.category, p.action, p.resource \
             FROM permissions p JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 ORDER BY p.id",
        )
        .bind(role.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("role_permissions", e))?;
        rows.iter()
            .map(permission_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("role_permissions", e))
    }

    #[instrument(skip(self), err)]
    async fn add_permission_to_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(role.as_i64())
        .bind(permission.as_i64())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_permission_to_role", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn remove_permission_from_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
            .bind(role.as_i64())
            .bind(permission.as_i64())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_permission_from_role", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn permission_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError> {
        let row = sqlx::query("SELECT * FROM permissions WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("permission_by_id", e))?;
        row.as_ref()
            .map(permission_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("permission_by_id", e))
    }

    #[instrument(skip(self), err)]
    async fn permission_by_system_name(
        &self,
        system_name: &str,
    ) -> Result<Option<Permission>, StoreError> {
        let row = sqlx::query("SELECT * FROM permissions WHERE system_name = $1")
            .bind(system_name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("permission_by_system_name", e))?;
        row.as_ref()
            .map(permission_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("permission_by_system_name", e))
    }

    #[instrument(skip(self), err)]
    async fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query("SELECT * FROM permissions ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_permissions", e))?;
        rows.iter()
            .map(permission_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_permissions", e))
    }

    #[instrument(skip(self), err)]
    async fn permissions_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query("SELECT * FROM permissions WHERE category = $1 ORDER BY id")
            .bind(category)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("permissions_by_category", e))?;
        rows.iter()
            .map(permission_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("permissions_by_category", e))
    }

    #[instrument(skip(self, permission), err)]
    async fn create_permission(&self, permission: Permission) -> Result<Permission, StoreError> {
        let row = sqlx::query(
            "INSERT INTO permissions (name, system_name, description, category, action, resource) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&permission.name)
        .bind(&permission.system_name)
        .bind(&permission.description)
        .bind(&permission.category)
        .bind(&permission.action)
        .bind(&permission.resource)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_permission", e))?;
        permission_from_row(&row).map_err(|e| map_sqlx_error("create_permission", e))
    }

    #[instrument(skip(self, permission), err)]
    async fn update_permission(&self, permission: &Permission) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE permissions SET name = $2, system_name = $3, description = $4, \
             category = $5, action = $6, resource = $7 WHERE id = $1",
        )
        .bind(permission.id.as_i64())
        .bind(&permission.name)
        .bind(&permission.system_name)
        .bind(&permission.description)
        .bind(&permission.category)
        .bind(&permission.action)
        .bind(&permission.resource)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_permission", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_permission(&self, id: PermissionId) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_permission", e))?;
        sqlx::query("DELETE FROM role_permissions WHERE permission_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_permission", e))?;
        sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_permission", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_permission", e))
    }

    #[instrument(skip(self), err)]
    async fn menu_item_by_id(&self, id: MenuItemId) -> Result<Option<MenuItem>, StoreError> {
        let row = sqlx::query(&format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("menu_item_by_id", e))?;
        row.as_ref()
            .map(menu_item_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("menu_item_by_id", e))
    }

    #[instrument(skip(self), err)]
    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {MENU_COLUMNS} FROM menu_items ORDER BY id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_menu_items", e))?;
        rows.iter()
            .map(menu_item_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_menu_items", e))
    }

    #[instrument(skip(self), err)]
    async fn top_level_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MENU_COLUMNS} FROM menu_items \
             WHERE parent_id = 0 AND is_visible ORDER BY display_order, id"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("top_level_menu_items", e))?;
        rows.iter()
            .map(menu_item_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("top_level_menu_items", e))
    }

    #[instrument(skip(self), err)]
    async fn menu_items_with_parent(
        &self,
        parent: MenuItemId,
    ) -> Result<Vec<MenuItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MENU_COLUMNS} FROM menu_items \
             WHERE parent_id = $1 AND is_visible ORDER BY display_order, id"
        ))
        .bind(parent.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("menu_items_with_parent", e))?;
        rows.iter()
            .map(menu_item_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("menu_items_with_parent", e))
    }

    #[instrument(skip(self), err)]
    async fn visible_menu_items_for_role(
        &self,
        role: RoleId,
    ) -> Result<Vec<MenuItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MENU_COLUMNS} FROM menu_items \
             WHERE is_visible AND (required_permission = '' OR required_permission IN ( \
                 SELECT p.system_name FROM permissions p \
                 JOIN role_permissions rp ON rp.permission_id = p.id \
                 WHERE rp.role_id = $1)) \
             ORDER BY parent_id, display_order, id"
        ))
        .bind(role.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("visible_menu_items_for_role", e))?;
        rows.iter()
            .map(menu_item_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("visible_menu_items_for_role", e))
    }

    #[instrument(skip(self, item), err)]
    async fn create_menu_item(&self, item: MenuItem) -> Result<MenuItem, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO menu_items (name, display_name, url, icon, parent_id, display_order, \
             is_visible, required_permission) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(&item.name)
        .bind(&item.display_name)
        .bind(&item.url)
        .bind(&item.icon)
        .bind(item.parent_id.as_i64())
        .bind(item.display_order)
        .bind(item.is_visible)
        .bind(&item.required_permission)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_menu_item", e))?;
        menu_item_from_row(&row).map_err(|e| map_sqlx_error("create_menu_item", e))
    }

    #[instrument(skip(self, item), err)]
    async fn update_menu_item(&self, item: &MenuItem) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE menu_items SET name = $2, display_name = $3, url = $4, icon = $5, \
             parent_id = $6, display_order = $7, is_visible = $8, required_permission = $9 \
             WHERE id = $1",
        )
        .bind(item.id.as_i64())
        .bind(&item.name)
        .bind(&item.display_name)
        .bind(&item.url)
        .bind(&item.icon)
        .bind(item.parent_id.as_i64())
        .bind(item.display_order)
        .bind(item.is_visible)
        .bind(&item.required_permission)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_menu_item", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id.as_i64())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_menu_item", e))?;
        Ok(())
    }
}
