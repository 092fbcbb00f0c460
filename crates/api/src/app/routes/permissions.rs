//! Permission administration endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use warden_core::PermissionId;
use warden_infra::PermissionInput;

use crate::app::{errors, services::AppServices};
use crate::authz::{permission_guard, policy};
use crate::middleware::AuthState;

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub name: String,
    pub system_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub resource: String,
}

impl From<PermissionRequest> for PermissionInput {
    fn from(value: PermissionRequest) -> Self {
        PermissionInput {
            name: value.name,
            system_name: value.system_name,
            description: value.description,
            category: value.category,
            action: value.action,
            resource: value.resource,
        }
    }
}

pub fn router(services: &Arc<AppServices>, auth_state: AuthState) -> Router {
    let guard = |policy: &'static str| {
        axum::middleware::from_fn_with_state((services.clone(), policy), permission_guard)
    };

    let view = Router::new()
        .route("/", get(list_permissions))
        .route("/:id", get(get_permission))
        .route("/category/:category", get(get_permissions_by_category))
        .route_layer(guard(policy::PERMISSIONS_VIEW));

    let assign = Router::new()
        .route("/", post(create_permission))
        .route("/:id", put(update_permission))
        .route("/:id", delete(delete_permission))
        .route_layer(guard(policy::PERMISSIONS_ASSIGN));

    view.merge(assign)
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ))
        .layer(Extension(services.clone()))
}

/// GET /api/permissions
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.permission_admin.list_permissions().await {
        Ok(permissions) => (StatusCode::OK, Json(permissions)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/permissions/:id
pub async fn get_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services
        .permission_admin
        .permission_by_id(PermissionId::from_i64(id))
        .await
    {
        Ok(permission) => (StatusCode::OK, Json(permission)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/permissions/category/:category
pub async fn get_permissions_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category): Path<String>,
) -> axum::response::Response {
    match services
        .permission_admin
        .permissions_by_category(&category)
        .await
    {
        Ok(permissions) => (StatusCode::OK, Json(permissions)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/permissions
pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<PermissionRequest>,
) -> axum::response::Response {
    match services.permission_admin.create_permission(body.into()).await {
        Ok(permission) => (StatusCode::CREATED, Json(permission)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// PUT /api/permissions/:id
pub async fn update_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
    Json(body): Json<PermissionRequest>,
) -> axum::response::Response {
    match services
        .permission_admin
        .update_permission(PermissionId::from_i64(id), body.into())
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// DELETE /api/permissions/:id
pub async fn delete_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services
        .permission_admin
        .delete_permission(PermissionId::from_i64(id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}
