//! In-memory implementations of the store contracts.
//!
//! Each write takes the lock once, validates the merged record, and commits
//! it, which gives the same all-or-nothing behaviour as the single SQL
//! `UPDATE` of [`PgRequestStore`](crate::PgRequestStore).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serenade_core::error::CoreError;
use serenade_core::ports::{RequestStore, TestimonialSource, UserDirectory};
use serenade_core::request::{CreateRequest, Request, RequestPatch};
use serenade_core::types::{RequestId, UserId};
use serenade_core::user::{Testimonial, UserProfile};
use tokio::sync::RwLock;

/// Request store held in process memory.
#[derive(Default)]
pub struct InMemoryRequestStore {
    rows: RwLock<HashMap<RequestId, Request>>,
    writes: AtomicU64,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row verbatim (fixtures and demos).
    pub async fn seed(&self, request: Request) {
        self.rows.write().await.insert(request.id, request);
    }

    /// Number of updates committed so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

fn newest_first(mut rows: Vec<Request>) -> Vec<Request> {
    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    rows
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn get(&self, id: RequestId) -> Result<Option<Request>, CoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Request>, CoreError> {
        let rows = self.rows.read().await;
        Ok(newest_first(
            rows.values()
                .filter(|r| r.owner_id == owner_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Request>, CoreError> {
        let rows = self.rows.read().await;
        Ok(newest_first(rows.values().cloned().collect()))
    }

    async fn create(&self, input: &CreateRequest) -> Result<Request, CoreError> {
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.get(&input.id) {
            if existing.owner_id != input.owner_id {
                return Err(CoreError::Conflict(format!(
                    "request id {} is already taken",
                    input.id
                )));
            }
            return Ok(existing.clone());
        }
        let request = Request::from_submission(input, Utc::now());
        rows.insert(request.id, request.clone());
        Ok(request)
    }

    async fn update(&self, id: RequestId, patch: &RequestPatch) -> Result<Request, CoreError> {
        let mut rows = self.rows.write().await;
        let current = rows.get(&id).ok_or_else(|| CoreError::request_not_found(id))?;
        let next = current.apply_patch(patch, Utc::now())?;
        rows.insert(id, next.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(next)
    }
}

/// Profiles and testimonials held in process memory.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserProfile>>,
    testimonials: RwLock<Vec<Testimonial>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, profile: UserProfile) {
        self.users.write().await.insert(profile.id, profile);
    }

    pub async fn insert_testimonial(&self, testimonial: Testimonial) {
        self.testimonials.write().await.push(testimonial);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<UserProfile>, CoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl TestimonialSource for InMemoryUserDirectory {
    async fn list_testimonials(&self, limit: i64) -> Result<Vec<Testimonial>, CoreError> {
        let mut all = self.testimonials.read().await.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(all)
    }
}
