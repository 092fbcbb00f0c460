//! The authenticated user's own menu.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::middleware::AuthState;

pub fn router(services: &Arc<AppServices>, auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(get_user_menu))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ))
        .layer(Extension(services.clone()))
}

/// GET /api/usermenu
pub async fn get_user_menu(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.menus.authorized_menu_items(principal.user_id()).await {
        Ok(items) => (StatusCode::OK, Json(&*items)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}
