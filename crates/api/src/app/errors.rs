use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warden_core::DomainError;
use warden_infra::ServiceError;

/// Translate a service failure into the wire error shape.
pub fn service_error_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        ServiceError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        ServiceError::Domain(DomainError::InvariantViolation(msg)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        ServiceError::Domain(DomainError::Unauthorized) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "internal storage failure",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
