//! Name-driven permission guard for protected routes.
//!
//! Every protected route declares one of the policy constants below and is
//! wrapped with [`permission_guard`]; a single evaluator handles all of
//! them. The guard parses the policy name into a structured requirement on
//! each request, extracts the principal set by the bearer middleware, and
//! asks the resolver's `authorize` entry point (which keeps the empty-name
//! open-access convention). Nothing escapes the guard: any internal failure
//! degrades to a deny.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use warden_auth::PermissionRequirement;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// Policy names declared by protected routes.
pub mod policy {
    pub const ROLES_VIEW: &str = "permission:roles.view";
    pub const ROLES_CREATE: &str = "permission:roles.create";
    pub const ROLES_EDIT: &str = "permission:roles.edit";
    pub const ROLES_DELETE: &str = "permission:roles.delete";
    pub const PERMISSIONS_VIEW: &str = "permission:permissions.view";
    pub const PERMISSIONS_ASSIGN: &str = "permission:permissions.assign";
    pub const MENUS_MANAGE: &str = "permission:menus.manage";
}

/// The generic policy evaluator.
///
/// Wired per route group with
/// `middleware::from_fn_with_state((services, policy), permission_guard)`.
pub async fn permission_guard(
    State((services, policy)): State<(Arc<AppServices>, &'static str)>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(requirement) = PermissionRequirement::from_policy_name(policy) else {
        tracing::error!(policy, "route declares a non-permission policy");
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden");
    };

    let Some(principal) = req.extensions().get::<PrincipalContext>().cloned() else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required",
        );
    };

    match services
        .permissions
        .authorize(principal.user_id(), requirement.permission())
        .await
    {
        Ok(true) => next.run(req).await,
        Ok(false) => errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "insufficient permissions",
        ),
        Err(err) => {
            tracing::warn!(error = %err, policy, "authorization check failed; denying");
            errors::json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                "insufficient permissions",
            )
        }
    }
}
