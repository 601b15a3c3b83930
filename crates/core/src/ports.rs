//! Contracts for the collaborators the workflow consumes.
//!
//! Implementations live in other crates: Postgres and in-memory stores in
//! `serenade-db`, SMTP delivery in `serenade-events`, local media storage in
//! `serenade-fulfillment`.

use async_trait::async_trait;

use crate::delivery::DeliveryIntent;
use crate::error::CoreError;
use crate::request::{CreateRequest, Request, RequestPatch};
use crate::types::{DbId, MediaRef, RequestId, UserId};
use crate::user::{Testimonial, UserProfile};

/// Persistence for requests.
///
/// `update` is the sole concurrency guard: it must apply the whole patch or
/// nothing, bump `version`, and return the stored row.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn get(&self, id: RequestId) -> Result<Option<Request>, CoreError>;

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Request>, CoreError>;

    /// Every admin-visible request, newest first.
    async fn list_all(&self) -> Result<Vec<Request>, CoreError>;

    /// Create a request in its initial state. Creating an id that already
    /// exists returns the stored row unchanged.
    async fn create(&self, input: &CreateRequest) -> Result<Request, CoreError>;

    /// Apply `patch` atomically. Fails with `NotFound` for unknown ids and
    /// `Conflict` when `patch.expected_version` does not match.
    async fn update(&self, id: RequestId, patch: &RequestPatch) -> Result<Request, CoreError>;
}

/// Read-only access to profiles owned by the identity provider.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<UserProfile>, CoreError>;
}

/// Read-only testimonial lookup.
#[async_trait]
pub trait TestimonialSource: Send + Sync {
    async fn list_testimonials(&self, limit: i64) -> Result<Vec<Testimonial>, CoreError>;
}

/// Binary media storage. Returned URLs are opaque media references.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<MediaRef, CoreError>;

    fn public_url(&self, path: &str) -> MediaRef;
}

/// Outbound delivery of finished tracks. The workflow never retries a failed
/// send; retry policy belongs to the implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, intent: &DeliveryIntent) -> Result<(), CoreError>;
}

/// Lookup used when an id is known to exist.
pub async fn require_request(
    store: &dyn RequestStore,
    id: RequestId,
) -> Result<Request, CoreError> {
    store
        .get(id)
        .await?
        .ok_or_else(|| CoreError::request_not_found(id))
}

/// Lookup used when a user id is known to exist.
pub async fn require_user(users: &dyn UserDirectory, id: DbId) -> Result<UserProfile, CoreError> {
    users.find_user(id).await?.ok_or_else(|| CoreError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}
