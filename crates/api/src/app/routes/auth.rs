//! Registration, login, token refresh, and credential recovery endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use warden_core::UserId;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::middleware::AuthState;
use warden_infra::Registration;

// ─────────────────────────────────────────────────────────────────────────────
// Request DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub user_id: String,
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router(services: &Arc<AppServices>, auth_state: AuthState) -> Router {
    let public = Router::new()
        .route("/register", post(register))
        .route("/verify-email", get(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password));

    let authenticated = Router::new()
        .route("/change-password", post(change_password))
        .route("/revoke-token", post(revoke_token))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::middleware::auth_middleware,
        ));

    public
        .merge(authenticated)
        .layer(Extension(services.clone()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    let registration = Registration {
        username: body.username,
        email: body.email,
        password: body.password,
    };

    match services.accounts.register(registration).await {
        Ok(user) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": user.id,
                "username": user.username,
                "email": user.email,
                "message": "Registration successful. Please check your email to verify your account.",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// GET /api/auth/verify-email?user_id=..&token=..
pub async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<VerifyEmailQuery>,
) -> axum::response::Response {
    let user_id: UserId = match query.user_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
        }
    };

    match services.accounts.verify_email(user_id, &query.token).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Email verified successfully. You can now log in.",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/auth/resend-verification
pub async fn resend_verification(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ResendVerificationRequest>,
) -> axum::response::Response {
    match services.accounts.resend_verification(&body.email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "If your email exists in our system, a verification email has been sent.",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    match services.accounts.login(&body.username, &body.password).await {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/auth/refresh-token
pub async fn refresh_token(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RefreshTokenRequest>,
) -> axum::response::Response {
    match services.accounts.refresh(&body.refresh_token).await {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> axum::response::Response {
    match services.accounts.forgot_password(&body.email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "If your email exists in our system, a password reset link has been sent.",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ResetPasswordRequest>,
) -> axum::response::Response {
    let user_id: UserId = match body.user_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
        }
    };

    match services
        .accounts
        .reset_password(user_id, &body.token, &body.new_password, &body.confirm_password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Password has been reset successfully.",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/auth/change-password
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ChangePasswordRequest>,
) -> axum::response::Response {
    match services
        .accounts
        .change_password(
            principal.user_id(),
            &body.current_password,
            &body.new_password,
            &body.confirm_password,
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Password changed successfully." })),
        )
            .into_response(),
        Err(e) => errors::service_error_response(e),
    }
}

/// POST /api/auth/revoke-token
pub async fn revoke_token(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services
        .accounts
        .revoke_refresh_token(principal.user_id())
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_response(e),
    }
}
