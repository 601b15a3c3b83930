use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use serenade_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => {
                if core.is_access_denial() {
                    tracing::debug!(error = %core, "Request gated");
                }
                classify_core_error(core)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a domain error to status, code and client-facing message.
///
/// Gating outcomes are expected states, so they always read as "access
/// denied" rather than a generic failure.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::InvalidTransition(msg) => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION", msg.clone())
        }
        CoreError::UnvalidatedMedia { reason } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "MEDIA_CONFIRMATION_REQUIRED",
            reason.clone(),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::NotOwner { .. } => (
            StatusCode::FORBIDDEN,
            "ACCESS_DENIED",
            "Access denied".to_string(),
        ),
        CoreError::AccessDenied(msg) => (
            StatusCode::FORBIDDEN,
            "ACCESS_DENIED",
            format!("Access denied: {msg}"),
        ),
        CoreError::ReconciliationTimeout { .. } => {
            tracing::warn!(error = %err, "Reconciliation timeout reached a handler");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "RECONCILIATION_TIMEOUT",
                err.to_string(),
            )
        }
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}
