//! Payment-provider webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serenade_core::error::CoreError;
use serenade_core::request::Request;
use serenade_core::types::RequestId;

use crate::auth::signature::{verify_payload, SIGNATURE_HEADER};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentConfirmation {
    pub request_id: RequestId,
    /// Provider-side reference, logged for reconciliation with statements.
    pub reference: Option<String>,
}

/// POST /payments/confirm
///
/// The body must be signed with the shared webhook secret. Confirming an
/// already-paid request succeeds without a write.
pub async fn confirm_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<Request>>> {
    let secret = state.config.payment_webhook_secret.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "Payment webhook is not configured".into(),
        ))
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Missing {SIGNATURE_HEADER} header"
            )))
        })?;

    if !verify_payload(secret, &body, signature) {
        tracing::warn!("Payment webhook signature mismatch");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid payment signature".into(),
        )));
    }

    let input: PaymentConfirmation =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::info!(
        request_id = %input.request_id,
        reference = input.reference.as_deref().unwrap_or(""),
        "Payment confirmation received"
    );

    let updated = state.coordinator.confirm_payment(input.request_id).await?;
    state.admin_board.fold(updated.clone()).await;
    Ok(Json(DataResponse { data: updated }))
}
