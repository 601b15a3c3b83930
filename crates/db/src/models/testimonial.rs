//! Testimonial rows.

use serenade_core::types::{DbId, Timestamp};
use serenade_core::user::Testimonial;
use sqlx::FromRow;

/// A row from the `testimonials` table.
#[derive(Debug, Clone, FromRow)]
pub struct TestimonialRow {
    pub id: DbId,
    pub author_name: String,
    pub quote: String,
    pub rating: i16,
    pub is_approved: bool,
    pub created_at: Timestamp,
}

impl From<TestimonialRow> for Testimonial {
    fn from(row: TestimonialRow) -> Self {
        Testimonial {
            id: row.id,
            author_name: row.author_name,
            quote: row.quote,
            rating: row.rating,
            created_at: row.created_at,
        }
    }
}
