//! Per-user menu resolution.

use std::collections::HashSet;
use std::sync::Arc;

use warden_core::{MenuItem, MenuItemId, UserId};

use crate::cache::AuthCache;
use crate::store::CredentialStore;

use super::ServiceResult;

/// Resolves the menu items visible to a user.
///
/// For each role the user holds, the store yields the visible items whose
/// required permission is empty or granted to that role; the per-role lists
/// are unioned (first occurrence wins), ordered by (parent, display order),
/// and cached per user like the permission resolver.
pub struct MenuResolver {
    store: Arc<dyn CredentialStore>,
    cache: Arc<dyn AuthCache>,
}

impl MenuResolver {
    pub fn new(store: Arc<dyn CredentialStore>, cache: Arc<dyn AuthCache>) -> Self {
        Self { store, cache }
    }

    /// The ordered menu visible to the user.
    ///
    /// An unknown user resolves to an empty menu, not an error.
    pub async fn authorized_menu_items(
        &self,
        user: UserId,
    ) -> ServiceResult<Arc<Vec<MenuItem>>> {
        if let Some(hit) = self.cache.user_menu(user) {
            return Ok(hit);
        }

        if self.store.user_by_id(user).await?.is_none() {
            return Ok(Arc::new(Vec::new()));
        }

        let mut seen: HashSet<MenuItemId> = HashSet::new();
        let mut items: Vec<MenuItem> = Vec::new();
        for role in self.store.roles_for_user(user).await? {
            for item in self.store.visible_menu_items_for_role(role.id).await? {
                if seen.insert(item.id) {
                    items.push(item);
                }
            }
        }
        items.sort_by_key(|m| (m.parent_id, m.display_order));

        let items = Arc::new(items);
        self.cache.put_user_menu(user, items.clone());
        Ok(items)
    }
}
