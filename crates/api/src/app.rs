//! Router assembly.

use std::sync::Arc;

use axum::Router;

use crate::middleware::AuthState;

pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full application router.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        issuer: services.issuer.clone(),
    };

    Router::new()
        .nest(
            "/api/auth",
            routes::auth::router(&services, auth_state.clone()),
        )
        .nest(
            "/api/userinfo",
            routes::user_info::router(&services, auth_state.clone()),
        )
        .nest(
            "/api/usermenu",
            routes::user_menu::router(&services, auth_state.clone()),
        )
        .nest(
            "/api/userpermissions",
            routes::user_permissions::router(&services, auth_state.clone()),
        )
        .nest(
            "/api/roles",
            routes::roles::router(&services, auth_state.clone()),
        )
        .nest(
            "/api/permissions",
            routes::permissions::router(&services, auth_state.clone()),
        )
        .nest(
            "/api/menuitems",
            routes::menu_items::router(&services, auth_state),
        )
}
