use axum::routing::get;
use axum::Router;

use crate::handlers::testimonials;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(testimonials::list_testimonials))
}
