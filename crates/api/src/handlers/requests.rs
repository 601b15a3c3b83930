//! Customer-facing request handlers.
//!
//! Every read goes through the access rules in `serenade_core::access`, so
//! media references only appear when the caller may consume them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serenade_core::access::{resolve_media, MediaKind, RequestView};
use serenade_core::ports::require_request;
use serenade_core::priority::{sort_by_priority, DashboardSummary};
use serenade_core::request::RequestDetails;
use serenade_core::types::{MediaRef, RequestId};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /requests`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Client-minted id; resubmitting the same id returns the stored request.
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub details: RequestDetails,
}

#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub request_id: RequestId,
    pub kind: MediaKind,
    pub media_ref: MediaRef,
}

/// POST /requests
pub async fn submit_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RequestView>>)> {
    let created = state
        .coordinator
        .submit_request(auth.user_id, input.id, input.details)
        .await?;
    let view = RequestView::for_actor(auth.actor, &created)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /requests
///
/// The caller's requests in dashboard priority order.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RequestView>>>> {
    let requests = sort_by_priority(state.store.list_by_owner(auth.user_id).await?);
    let views = requests
        .iter()
        .map(|r| RequestView::for_actor(auth.actor, r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data: views }))
}

/// GET /requests/dashboard
pub async fn dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let requests = state.store.list_by_owner(auth.user_id).await?;
    let summary = DashboardSummary::build(auth.actor, &requests)?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /requests/{id}
pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> AppResult<Json<DataResponse<RequestView>>> {
    let request = require_request(state.store.as_ref(), id).await?;
    let view = RequestView::for_actor(auth.actor, &request)?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /requests/{id}/media/{kind}
///
/// 403 `ACCESS_DENIED` while the artifact is locked.
pub async fn get_media(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, kind)): Path<(RequestId, MediaKind)>,
) -> AppResult<Json<DataResponse<MediaResponse>>> {
    let request = require_request(state.store.as_ref(), id).await?;
    let media_ref = resolve_media(auth.actor, &request, kind)?.clone();
    tracing::debug!(request_id = %id, ?kind, user_id = auth.user_id, "Media resolved");
    Ok(Json(DataResponse {
        data: MediaResponse {
            request_id: id,
            kind,
            media_ref,
        },
    }))
}
