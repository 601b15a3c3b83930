//! Request event audit rows.

use serde::Serialize;
use serenade_core::types::{DbId, RequestId, Timestamp};
use sqlx::FromRow;

/// A row from the `request_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestEventRow {
    pub id: DbId,
    pub event_type: String,
    pub request_id: RequestId,
    pub owner_id: DbId,
    pub actor_user_id: Option<DbId>,
    pub version: i64,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending an event.
#[derive(Debug, Clone)]
pub struct CreateRequestEvent<'a> {
    pub event_type: &'a str,
    pub request_id: RequestId,
    pub owner_id: DbId,
    pub actor_user_id: Option<DbId>,
    pub version: i64,
    pub payload: &'a serde_json::Value,
}
