//! Identity inspection: the caller's own profile, or any presented token.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::middleware::AuthState;
use warden_core::UserId;

#[derive(Debug, Deserialize)]
pub struct ValidateTokenRequest {
    pub token: String,
}

pub fn router(services: &Arc<AppServices>, auth_state: AuthState) -> Router {
    let me = Router::new()
        .route("/me", get(get_user_info))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ));

    let validate = Router::new().route("/validate-token", post(validate_token));

    me.merge(validate).layer(Extension(services.clone()))
}

/// GET /api/userinfo/me
pub async fn get_user_info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    user_info_response(&services, principal.user_id()).await
}

/// POST /api/userinfo/validate-token
///
/// Validates a token carried in the body instead of the Authorization
/// header, for callers that cannot set headers. Failures are a uniform 401.
pub async fn validate_token(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ValidateTokenRequest>,
) -> axum::response::Response {
    let claims = match services.issuer.validate(&body.token) {
        Ok(claims) => claims,
        Err(_) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid token");
        }
    };
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid token");
        }
    };

    user_info_response(&services, user_id).await
}

async fn user_info_response(
    services: &AppServices,
    user_id: UserId,
) -> axum::response::Response {
    let info = match services.accounts.user_info(user_id).await {
        Ok(info) => info,
        Err(e) => return errors::service_error_response(e),
    };
    let permissions = match services.permissions.user_permission_names(user_id).await {
        Ok(names) => names,
        Err(e) => return errors::service_error_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": info.id,
            "username": info.username,
            "email": info.email,
            "is_active": info.is_active,
            "email_confirmed": info.email_confirmed,
            "roles": info.roles,
            "permissions": permissions,
        })),
    )
        .into_response()
}
