use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serenade_core::user::Testimonial;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct TestimonialParams {
    pub limit: Option<i64>,
}

/// GET /testimonials?limit=
///
/// Public; approved testimonials, newest first.
pub async fn list_testimonials(
    State(state): State<AppState>,
    Query(params): Query<TestimonialParams>,
) -> AppResult<Json<DataResponse<Vec<Testimonial>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let items = state.testimonials.list_testimonials(limit).await?;
    Ok(Json(DataResponse { data: items }))
}
