//! Repository for the `testimonials` table.

use sqlx::PgPool;

use crate::models::testimonial::TestimonialRow;

const COLUMNS: &str = "id, author_name, quote, rating, is_approved, created_at";

/// Read access to published testimonials.
pub struct TestimonialRepo;

impl TestimonialRepo {
    /// List approved testimonials, newest first.
    pub async fn list_approved(pool: &PgPool, limit: i64) -> Result<Vec<TestimonialRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM testimonials \
             WHERE is_approved \
             ORDER BY created_at DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, TestimonialRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
