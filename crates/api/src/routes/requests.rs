//! Route definitions for the customer `/requests` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// POST   /                    -> submit_request
/// GET    /                    -> list_requests
/// GET    /dashboard           -> dashboard
/// GET    /{id}                -> get_request
/// GET    /{id}/media/{kind}   -> get_media
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(requests::list_requests).post(requests::submit_request),
        )
        .route("/dashboard", get(requests::dashboard))
        .route("/{id}", get(requests::get_request))
        .route("/{id}/media/{kind}", get(requests::get_media))
}
