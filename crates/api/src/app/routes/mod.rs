pub mod auth;
pub mod menu_items;
pub mod permissions;
pub mod roles;
pub mod user_info;
pub mod user_menu;
pub mod user_permissions;
