//! Menu item administration.

use std::sync::Arc;

use warden_core::{DomainError, MenuItem, MenuItemId};

use crate::store::CredentialStore;

use super::ServiceResult;

/// Fields accepted when creating or updating a menu item.
#[derive(Debug, Clone)]
pub struct MenuItemInput {
    pub name: String,
    pub display_name: String,
    pub url: String,
    pub icon: String,
    pub parent_id: MenuItemId,
    pub display_order: i32,
    pub is_visible: bool,
    pub required_permission: String,
}

/// Menu CRUD. Parent references are soft; the delete guard below is the
/// only thing keeping the tree intact.
pub struct MenuService {
    store: Arc<dyn CredentialStore>,
}

impl MenuService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn list_menu_items(&self) -> ServiceResult<Vec<MenuItem>> {
        Ok(self.store.list_menu_items().await?)
    }

    pub async fn menu_item_by_id(&self, id: MenuItemId) -> ServiceResult<MenuItem> {
        self.store
            .menu_item_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn top_level_menu_items(&self) -> ServiceResult<Vec<MenuItem>> {
        Ok(self.store.top_level_menu_items().await?)
    }

    pub async fn menu_items_with_parent(
        &self,
        parent: MenuItemId,
    ) -> ServiceResult<Vec<MenuItem>> {
        Ok(self.store.menu_items_with_parent(parent).await?)
    }

    pub async fn create_menu_item(&self, input: MenuItemInput) -> ServiceResult<MenuItem> {
        Ok(self
            .store
            .create_menu_item(MenuItem {
                id: MenuItemId::from_i64(0),
                name: input.name,
                display_name: input.display_name,
                url: input.url,
                icon: input.icon,
                parent_id: input.parent_id,
                display_order: input.display_order,
                is_visible: input.is_visible,
                required_permission: input.required_permission,
            })
            .await?)
    }

    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        input: MenuItemInput,
    ) -> ServiceResult<MenuItem> {
        self.menu_item_by_id(id).await?;

        let updated = MenuItem {
            id,
            name: input.name,
            display_name: input.display_name,
            url: input.url,
            icon: input.icon,
            parent_id: input.parent_id,
            display_order: input.display_order,
            is_visible: input.is_visible,
            required_permission: input.required_permission,
        };
        self.store.update_menu_item(&updated).await?;
        Ok(updated)
    }

    /// Delete a menu item. Items that still have children are rejected;
    /// children must be deleted or reparented first.
    pub async fn delete_menu_item(&self, id: MenuItemId) -> ServiceResult<()> {
        self.menu_item_by_id(id).await?;

        if !self.store.menu_items_with_parent(id).await?.is_empty() {
            return Err(DomainError::invariant(
                "cannot delete a menu item that still has children",
            )
            .into());
        }
        self.store.delete_menu_item(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceError;
    use crate::store::MemoryCredentialStore;

    fn input(name: &str, parent: MenuItemId) -> MenuItemInput {
        MenuItemInput {
            name: name.to_string(),
            display_name: name.to_string(),
            url: format!("/{name}"),
            icon: String::new(),
            parent_id: parent,
            display_order: 0,
            is_visible: true,
            required_permission: String::new(),
        }
    }

    #[tokio::test]
    async fn delete_with_children_is_rejected() {
        let store = Arc::new(MemoryCredentialStore::new());
        let service = MenuService::new(store.clone());

        let parent = service
            .create_menu_item(input("parent", MenuItemId::TOP_LEVEL))
            .await
            .unwrap();
        let child = service
            .create_menu_item(input("child", parent.id))
            .await
            .unwrap();

        let err = service.delete_menu_item(parent.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::InvariantViolation(_))
        ));
        assert!(store.menu_item_by_id(parent.id).await.unwrap().is_some());

        // Delete bottom-up succeeds.
        service.delete_menu_item(child.id).await.unwrap();
        service.delete_menu_item(parent.id).await.unwrap();
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let service = MenuService::new(Arc::new(MemoryCredentialStore::new()));
        let err = service
            .menu_item_by_id(MenuItemId::from_i64(9))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound)));
    }
}
