//! Repository for the `request_events` audit table.

use serenade_core::types::{DbId, RequestId};
use sqlx::PgPool;

use crate::models::event::{CreateRequestEvent, RequestEventRow};

const COLUMNS: &str =
    "id, event_type, request_id, owner_id, actor_user_id, version, payload, created_at";

/// Append-only access to the request event log.
pub struct EventRepo;

impl EventRepo {
    /// Append an event, returning its id.
    pub async fn insert(pool: &PgPool, input: &CreateRequestEvent<'_>) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO request_events \
                (event_type, request_id, owner_id, actor_user_id, version, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(input.event_type)
        .bind(input.request_id)
        .bind(input.owner_id)
        .bind(input.actor_user_id)
        .bind(input.version)
        .bind(input.payload)
        .fetch_one(pool)
        .await
    }

    /// History of one request in insertion order.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: RequestId,
    ) -> Result<Vec<RequestEventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM request_events WHERE request_id = $1 ORDER BY id");
        sqlx::query_as::<_, RequestEventRow>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }
}
