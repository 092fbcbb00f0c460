//! Menu item administration endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use warden_core::MenuItemId;
use warden_infra::MenuItemInput;

use crate::app::{errors, services::AppServices};
use crate::authz::{permission_guard, policy};
use crate::middleware::AuthState;

#[derive(Debug, Deserialize)]
pub struct MenuItemRequest {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub parent_id: i64,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub required_permission: String,
}

fn default_visible() -> bool {
    true
}

impl From<MenuItemRequest> for MenuItemInput {
    fn from(value: MenuItemRequest) -> Self {
        MenuItemInput {
            name: value.name,
            display_name: value.display_name,
            url: value.url,
            icon: value.icon,
            parent_id: MenuItemId::from_i64(value.parent_id),
            display_order: value.display_order,
            is_visible: value.is_visible,
            required_permission: value.required_permission,
        }
    }
}

pub fn router(services: &Arc<AppServices>, auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(list_menu_items))
        .route("/", post(create_menu_item))
        .route("/toplevel", get(get_top_level_menu_items))
        .route("/parent/:parent_id", get(get_menu_items_by_parent))
        .route("/:id", get(get_menu_item))
        .route("/:id", put(update_menu_item))
        .route("/:id", delete(delete_menu_item))
        .route_layer(axum::middleware::from_fn_with_state(
            (services.clone(), policy::MENUS_MANAGE),
            permission_guard,
        ))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ))
        .layer(Extension(services.clone()))
}

/// GET /api/menuitems
pub async fn list_menu_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.menu_admin.list_menu_items().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/menuitems/:id
pub async fn get_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services
        .menu_admin
        .menu_item_by_id(MenuItemId::from_i64(id))
        .await
    {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/menuitems/toplevel
pub async fn get_top_level_menu_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.menu_admin.top_level_menu_items().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/menuitems/parent/:parent_id
pub async fn get_menu_items_by_parent(
    Extension(services): Extension<Arc<AppServices>>,
    Path(parent_id): Path<i64>,
) -> axum::response::Response {
    match services
        .menu_admin
        .menu_items_with_parent(MenuItemId::from_i64(parent_id))
        .await
    {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/menuitems
pub async fn create_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<MenuItemRequest>,
) -> axum::response::Response {
    match services.menu_admin.create_menu_item(body.into()).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// PUT /api/menuitems/:id
pub async fn update_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
    Json(body): Json<MenuItemRequest>,
) -> axum::response::Response {
    match services
        .menu_admin
        .update_menu_item(MenuItemId::from_i64(id), body.into())
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// DELETE /api/menuitems/:id
pub async fn delete_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services
        .menu_admin
        .delete_menu_item(MenuItemId::from_i64(id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}
