/// Database primary keys for users and testimonials are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Request identifiers are UUID v7 so a client can mint one before the store
/// confirms the record.
pub type RequestId = uuid::Uuid;

/// Identity of a customer or admin, as issued by the identity provider.
pub type UserId = DbId;

/// Opaque reference to a playable artifact (URL or storage path).
pub type MediaRef = String;

/// Mint a new time-ordered request id.
pub fn new_request_id() -> RequestId {
    uuid::Uuid::now_v7()
}
