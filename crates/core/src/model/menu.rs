//! Menu item record.

use serde::{Deserialize, Serialize};

use crate::id::MenuItemId;

/// A navigation menu entry.
///
/// `parent_id` is a soft reference (`MenuItemId::TOP_LEVEL` for roots); the
/// tree shape is not enforced by the store. An empty `required_permission`
/// means the item is visible to everyone once `is_visible` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub display_name: String,
    pub url: String,
    pub icon: String,
    pub parent_id: MenuItemId,
    pub display_order: i32,
    pub is_visible: bool,
    pub required_permission: String,
}

impl MenuItem {
    pub fn is_top_level(&self) -> bool {
        self.parent_id == MenuItemId::TOP_LEVEL
    }
}
