//! Admin fulfillment handlers.
//!
//! Writes go through the [`FulfillmentCoordinator`](serenade_fulfillment::FulfillmentCoordinator);
//! each response is also folded into the admin board so the next listing
//! reflects it without waiting for the feed.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Deserialize;
use serenade_core::access::MediaKind;
use serenade_core::delivery::DeliveryIntent;
use serenade_core::media_link::LinkVerdict;
use serenade_core::priority::sort_by_priority;
use serenade_core::request::{PaymentStatus, Request, RequestStatus};
use serenade_core::types::RequestId;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    pub status: RequestStatus,
    /// Allows a backward move; clears the final media.
    #[serde(default)]
    pub correction: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayment {
    pub payment_status: PaymentStatus,
    #[serde(default, rename = "override")]
    pub admin_override: bool,
}

#[derive(Debug, Deserialize)]
pub struct AttachMedia {
    pub media_ref: String,
    /// Confirms a link the validator could not recognise.
    #[serde(default)]
    pub force: bool,
    /// `full` (default) attaches the finished track; `preview` replaces
    /// only the excerpt.
    pub kind: Option<MediaKind>,
}

#[derive(Debug, Deserialize)]
pub struct TechnicalDetails {
    pub technical_details: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateLink {
    pub media_ref: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin/requests
///
/// The reconciled admin board in priority order.
pub async fn list_requests(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Request>>>> {
    let model = state.admin_board.model();
    if model.read().await.is_empty() {
        state.admin_board.refresh().await?;
    }
    let requests = sort_by_priority(model.read().await.requests());
    Ok(Json(DataResponse { data: requests }))
}

/// PUT /admin/requests/{id}/status
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    Json(input): Json<UpdateStatus>,
) -> AppResult<Json<DataResponse<Request>>> {
    let updated = state
        .coordinator
        .set_status(admin.actor, id, input.status, input.correction)
        .await?;
    Ok(Json(DataResponse {
        data: fold_into_board(&state, updated).await,
    }))
}

/// PUT /admin/requests/{id}/payment
pub async fn update_payment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    Json(input): Json<UpdatePayment>,
) -> AppResult<Json<DataResponse<Request>>> {
    let updated = state
        .coordinator
        .set_payment(admin.actor, id, input.payment_status, input.admin_override)
        .await?;
    Ok(Json(DataResponse {
        data: fold_into_board(&state, updated).await,
    }))
}

/// POST /admin/requests/{id}/media
///
/// 422 `MEDIA_CONFIRMATION_REQUIRED` when the link needs `force`.
pub async fn attach_media(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    Json(input): Json<AttachMedia>,
) -> AppResult<Json<DataResponse<Request>>> {
    let coordinator = &state.coordinator;
    let updated = match input.kind.unwrap_or(MediaKind::Full) {
        MediaKind::Full => {
            coordinator
                .attach_final_media(admin.actor, id, &input.media_ref, input.force)
                .await?
        }
        MediaKind::Preview => {
            coordinator
                .set_preview_media(admin.actor, id, &input.media_ref, input.force)
                .await?
        }
    };
    Ok(Json(DataResponse {
        data: fold_into_board(&state, updated).await,
    }))
}

/// POST /admin/requests/{id}/media/upload
///
/// Multipart with a single `file` field holding the finished track.
pub async fn upload_media(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Request>>> {
    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("track.mp3").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_data = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let updated = state
        .coordinator
        .upload_final_media(admin.actor, id, &data, &filename)
        .await?;
    Ok(Json(DataResponse {
        data: fold_into_board(&state, updated).await,
    }))
}

/// PUT /admin/requests/{id}/technical-details
pub async fn update_technical_details(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
    Json(input): Json<TechnicalDetails>,
) -> AppResult<Json<DataResponse<Request>>> {
    let updated = state
        .coordinator
        .attach_technical_details(admin.actor, id, &input.technical_details)
        .await?;
    Ok(Json(DataResponse {
        data: fold_into_board(&state, updated).await,
    }))
}

/// GET /admin/requests/{id}/delivery
///
/// Preview the delivery intent without sending anything.
pub async fn delivery_intent(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> AppResult<Json<DataResponse<DeliveryIntent>>> {
    let intent = state.coordinator.request_delivery(admin.actor, id).await?;
    Ok(Json(DataResponse { data: intent }))
}

/// POST /admin/requests/{id}/deliver
pub async fn deliver(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> AppResult<Json<DataResponse<DeliveryIntent>>> {
    let intent = state.coordinator.deliver(admin.actor, id).await?;
    Ok(Json(DataResponse { data: intent }))
}

/// POST /admin/media-links/validate
///
/// Dry-run of the link check the attach endpoint applies.
pub async fn validate_link(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ValidateLink>,
) -> AppResult<Json<DataResponse<LinkVerdict>>> {
    let verdict = state.coordinator.validator().validate(&input.media_ref);
    Ok(Json(DataResponse { data: verdict }))
}

async fn fold_into_board(state: &AppState, updated: Request) -> Request {
    state.admin_board.fold(updated.clone()).await;
    updated
}
