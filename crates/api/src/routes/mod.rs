pub mod admin;
pub mod health;
pub mod payments;
pub mod requests;
pub mod testimonials;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /requests                                    submit, list (customer)
/// /requests/dashboard                          priority summary
/// /requests/{id}                               view
/// /requests/{id}/media/{kind}                  gated media (preview | full)
///
/// /admin/requests                              reconciled board (admin only)
/// /admin/requests/{id}/status                  status change (PUT)
/// /admin/requests/{id}/payment                 payment change (PUT)
/// /admin/requests/{id}/media                   attach link (POST)
/// /admin/requests/{id}/media/upload            upload track (POST, multipart)
/// /admin/requests/{id}/technical-details       annex (PUT)
/// /admin/requests/{id}/delivery                delivery intent preview (GET)
/// /admin/requests/{id}/deliver                 hand to notifier (POST)
/// /admin/media-links/validate                  link dry-run (POST)
///
/// /payments/confirm                            signed provider webhook
///
/// /testimonials                                public
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/requests", requests::router())
        .nest("/admin", admin::router())
        .nest("/payments", payments::router())
        .nest("/testimonials", testimonials::router())
}
