//! Route definitions for `/admin`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(admin::list_requests))
        .route("/requests/{id}/status", put(admin::update_status))
        .route("/requests/{id}/payment", put(admin::update_payment))
        .route("/requests/{id}/media", post(admin::attach_media))
        .route("/requests/{id}/media/upload", post(admin::upload_media))
        .route(
            "/requests/{id}/technical-details",
            put(admin::update_technical_details),
        )
        .route("/requests/{id}/delivery", get(admin::delivery_intent))
        .route("/requests/{id}/deliver", post(admin::deliver))
        .route("/media-links/validate", post(admin::validate_link))
}
