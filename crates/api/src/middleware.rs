use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use warden_auth::TokenIssuer;

use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub issuer: Arc<TokenIssuer>,
}

/// Bearer-token authentication.
///
/// Validates the presented access token and stores the principal in request
/// extensions. Missing header, malformed token, bad signature, and a
/// non-numeric subject all yield the same bare 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .issuer
        .validate(token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id = claims.user_id().map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(PrincipalContext::new(
        user_id,
        claims.name.clone(),
        claims.roles.clone(),
    ));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
