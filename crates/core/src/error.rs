use crate::types::RequestId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A status or payment change that the lifecycle rules do not allow.
    /// Never coerced into a success.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The media link did not pass the heuristic check and no override was
    /// given. The caller may retry with `force` after human confirmation.
    #[error("Media link requires confirmation: {reason}")]
    UnvalidatedMedia { reason: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request {request_id} is not owned by the acting user")]
    NotOwner { request_id: RequestId },

    /// Expected gating outcome (e.g. full track requested before payment).
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// An optimistic record was not confirmed by the store in time. Surfaced
    /// as a warning; the underlying create may still land later.
    #[error("Request {request_id} was not confirmed by the store within {waited_secs}s")]
    ReconciliationTimeout {
        request_id: RequestId,
        waited_secs: i64,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing request.
    pub fn request_not_found(id: RequestId) -> Self {
        CoreError::NotFound {
            entity: "Request",
            id: id.to_string(),
        }
    }

    /// Whether the error is an expected gating outcome rather than a fault.
    pub fn is_access_denial(&self) -> bool {
        matches!(
            self,
            CoreError::NotOwner { .. } | CoreError::AccessDenied(_)
        )
    }
}
