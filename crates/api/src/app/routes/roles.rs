//! Role administration endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use warden_core::{PermissionId, RoleId, UserId};
use warden_infra::RoleInput;

use crate::app::{errors, services::AppServices};
use crate::authz::{permission_guard, policy};
use crate::middleware::AuthState;

// ─────────────────────────────────────────────────────────────────────────────
// Request DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    pub system_name: String,
    #[serde(default)]
    pub description: String,
}

impl From<RoleRequest> for RoleInput {
    fn from(value: RoleRequest) -> Self {
        RoleInput {
            name: value.name,
            system_name: value.system_name,
            description: value.description,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router(services: &Arc<AppServices>, auth_state: AuthState) -> Router {
    let guard = |policy: &'static str| {
        axum::middleware::from_fn_with_state((services.clone(), policy), permission_guard)
    };

    let view = Router::new()
        .route("/", get(list_roles))
        .route("/:id", get(get_role))
        .route("/:id/permissions", get(get_role_permissions))
        .route("/:id/users", get(get_users_in_role))
        .route_layer(guard(policy::ROLES_VIEW));

    let create = Router::new()
        .route("/", post(create_role))
        .route_layer(guard(policy::ROLES_CREATE));

    let edit = Router::new()
        .route("/:id", put(update_role))
        .route("/:id/users/:user_id", post(add_user_to_role))
        .route("/:id/users/:user_id", delete(remove_user_from_role))
        .route_layer(guard(policy::ROLES_EDIT));

    let remove = Router::new()
        .route("/:id", delete(delete_role))
        .route_layer(guard(policy::ROLES_DELETE));

    let assign = Router::new()
        .route("/:id/permissions/:permission_id", post(add_permission_to_role))
        .route(
            "/:id/permissions/:permission_id",
            delete(remove_permission_from_role),
        )
        .route_layer(guard(policy::PERMISSIONS_ASSIGN));

    view.merge(create)
        .merge(edit)
        .merge(remove)
        .merge(assign)
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ))
        .layer(Extension(services.clone()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/roles
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.roles.list_roles().await {
        Ok(roles) => (StatusCode::OK, Json(roles)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/roles/:id
pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services.roles.role_by_id(RoleId::from_i64(id)).await {
        Ok(role) => (StatusCode::OK, Json(role)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/roles/:id/permissions
pub async fn get_role_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let id = RoleId::from_i64(id);
    if let Err(e) = services.roles.role_by_id(id).await {
        return errors::service_error_response(e);
    }
    match services.roles.role_permissions(id).await {
        Ok(permissions) => (StatusCode::OK, Json(&*permissions)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/roles
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RoleRequest>,
) -> axum::response::Response {
    match services.roles.create_role(body.into()).await {
        Ok(role) => (StatusCode::CREATED, Json(role)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// PUT /api/roles/:id
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
    Json(body): Json<RoleRequest>,
) -> axum::response::Response {
    match services
        .roles
        .update_role(RoleId::from_i64(id), body.into())
        .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// DELETE /api/roles/:id
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services.roles.delete_role(RoleId::from_i64(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/roles/:id/permissions/:permission_id
pub async fn add_permission_to_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, permission_id)): Path<(i64, i64)>,
) -> axum::response::Response {
    match services
        .roles
        .add_permission_to_role(RoleId::from_i64(id), PermissionId::from_i64(permission_id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// DELETE /api/roles/:id/permissions/:permission_id
pub async fn remove_permission_from_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, permission_id)): Path<(i64, i64)>,
) -> axum::response::Response {
    match services
        .roles
        .remove_permission_from_role(RoleId::from_i64(id), PermissionId::from_i64(permission_id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/roles/:id/users
pub async fn get_users_in_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services.roles.users_in_role(RoleId::from_i64(id)).await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/roles/:id/users/:user_id
pub async fn add_user_to_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> axum::response::Response {
    match services
        .roles
        .add_user_to_role(UserId::from_i64(user_id), RoleId::from_i64(id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// DELETE /api/roles/:id/users/:user_id
pub async fn remove_user_from_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> axum::response::Response {
    match services
        .roles
        .remove_user_from_role(UserId::from_i64(user_id), RoleId::from_i64(id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}
