//! Repository for the `requests` table.

use serenade_core::request::{CreateRequest, PaymentStatus, RequestPatch, RequestStatus};
use serenade_core::types::{RequestId, UserId};
use sqlx::PgPool;

use crate::models::request::RequestRow;

const COLUMNS: &str = "id, owner_id, status, payment_status, preview_media, full_media, \
     honoree_name, story, genre, tone, voice, include_names, names_to_include, \
     cover_image_ref, technical_details, version, created_at, updated_at";

/// Provides create/read/update operations for song requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new request in its initial state.
    ///
    /// Returns `None` when a row with the same id already exists; the caller
    /// decides whether that is a retry or a collision.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateRequest,
    ) -> Result<Option<RequestRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO requests \
                (id, owner_id, status, payment_status, honoree_name, story, genre, tone, \
                 voice, include_names, names_to_include, cover_image_ref) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let details = &input.details;
        sqlx::query_as::<_, RequestRow>(&query)
            .bind(input.id)
            .bind(input.owner_id)
            .bind(RequestStatus::Pending.name())
            .bind(PaymentStatus::Unpaid.name())
            .bind(details.honoree_name.trim())
            .bind(details.story.trim())
            .bind(&details.genre)
            .bind(&details.tone)
            .bind(&details.voice)
            .bind(details.include_names)
            .bind(&details.names_to_include)
            .bind(&details.cover_image_ref)
            .fetch_optional(pool)
            .await
    }

    /// Find a request by id.
    pub async fn find_by_id(pool: &PgPool, id: RequestId) -> Result<Option<RequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
        sqlx::query_as::<_, RequestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one customer's requests, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: UserId) -> Result<Vec<RequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RequestRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List every request, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<RequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, RequestRow>(&query).fetch_all(pool).await
    }

    /// Apply a patch in a single `UPDATE`, bumping `version`.
    ///
    /// Media columns are only touched when the patch carries the outer
    /// `Some`. Returns `None` when the id is unknown or the pinned version no
    /// longer matches.
    pub async fn apply_patch(
        pool: &PgPool,
        id: RequestId,
        patch: &RequestPatch,
    ) -> Result<Option<RequestRow>, sqlx::Error> {
        let query = format!(
            "UPDATE requests SET \
                status = COALESCE($2, status), \
                payment_status = COALESCE($3, payment_status), \
                preview_media = CASE WHEN $4 THEN $5 ELSE preview_media END, \
                full_media = CASE WHEN $6 THEN $7 ELSE full_media END, \
                technical_details = COALESCE($8, technical_details), \
                version = version + 1, \
                updated_at = NOW() \
             WHERE id = $1 AND ($9::BIGINT IS NULL OR version = $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RequestRow>(&query)
            .bind(id)
            .bind(patch.status.map(RequestStatus::name))
            .bind(patch.payment_status.map(PaymentStatus::name))
            .bind(patch.preview_media.is_some())
            .bind(patch.preview_media.clone().flatten())
            .bind(patch.full_media.is_some())
            .bind(patch.full_media.clone().flatten())
            .bind(&patch.technical_details)
            .bind(patch.expected_version)
            .fetch_optional(pool)
            .await
    }
}
