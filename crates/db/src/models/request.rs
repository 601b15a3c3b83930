//! Request rows.

use serenade_core::error::CoreError;
use serenade_core::request::{PaymentStatus, Request, RequestStatus};
use serenade_core::types::{DbId, RequestId, Timestamp};
use sqlx::FromRow;

/// A row from the `requests` table. Status columns are stored as text and
/// parsed into the closed enums on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct RequestRow {
    pub id: RequestId,
    pub owner_id: DbId,
    pub status: String,
    pub payment_status: String,
    pub preview_media: Option<String>,
    pub full_media: Option<String>,
    pub honoree_name: String,
    pub story: String,
    pub genre: String,
    pub tone: String,
    pub voice: String,
    pub include_names: bool,
    pub names_to_include: Option<String>,
    pub cover_image_ref: Option<String>,
    pub technical_details: Option<String>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<RequestRow> for Request {
    type Error = CoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Request {
            id: row.id,
            owner_id: row.owner_id,
            status: RequestStatus::from_name(&row.status)?,
            payment_status: PaymentStatus::from_name(&row.payment_status)?,
            preview_media: row.preview_media,
            full_media: row.full_media,
            honoree_name: row.honoree_name,
            story: row.story,
            genre: row.genre,
            tone: row.tone,
            voice: row.voice,
            include_names: row.include_names,
            names_to_include: row.names_to_include,
            cover_image_ref: row.cover_image_ref,
            technical_details: row.technical_details,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, payment: &str) -> RequestRow {
        let now = chrono::Utc::now();
        RequestRow {
            id: uuid::Uuid::now_v7(),
            owner_id: 1,
            status: status.to_string(),
            payment_status: payment.to_string(),
            preview_media: None,
            full_media: None,
            honoree_name: "Leo".to_string(),
            story: "First steps".to_string(),
            genre: "pop".to_string(),
            tone: "happy".to_string(),
            voice: "male".to_string(),
            include_names: false,
            names_to_include: None,
            cover_image_ref: None,
            technical_details: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn known_status_text_converts() {
        let request = Request::try_from(row("in_production", "paid")).unwrap();
        assert_eq!(request.status, RequestStatus::InProduction);
        assert_eq!(request.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn unknown_status_text_is_rejected() {
        assert!(Request::try_from(row("shipped", "paid")).is_err());
        assert!(Request::try_from(row("pending", "refunded")).is_err());
    }
}
