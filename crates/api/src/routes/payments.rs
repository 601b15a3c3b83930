use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`. Authenticated by signature, not token.
pub fn router() -> Router<AppState> {
    Router::new().route("/confirm", post(payments::confirm_payment))
}
