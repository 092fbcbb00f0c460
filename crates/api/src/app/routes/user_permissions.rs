//! The authenticated user's own permissions.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use warden_auth::PermissionName;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::middleware::AuthState;

pub fn router(services: &Arc<AppServices>, auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(get_user_permissions))
        .route("/names", get(get_user_permission_names))
        .route("/check/:permission_name", get(check_permission))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ))
        .layer(Extension(services.clone()))
}

/// GET /api/userpermissions
pub async fn get_user_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services
        .permissions
        .user_permissions(principal.user_id())
        .await
    {
        Ok(permissions) => (StatusCode::OK, Json(&*permissions)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/userpermissions/names
pub async fn get_user_permission_names(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services
        .permissions
        .user_permission_names(principal.user_id())
        .await
    {
        Ok(names) => (StatusCode::OK, Json(names)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/userpermissions/check/:permission_name
pub async fn check_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(permission_name): Path<String>,
) -> axum::response::Response {
    match services
        .permissions
        .has_permission(principal.user_id(), &PermissionName::new(permission_name))
        .await
    {
        Ok(held) => (StatusCode::OK, Json(held)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}
