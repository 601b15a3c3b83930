//! Postgres implementation of the core store contracts.

use async_trait::async_trait;
use serenade_core::error::CoreError;
use serenade_core::ports::{RequestStore, TestimonialSource, UserDirectory};
use serenade_core::request::{CreateRequest, Request, RequestPatch};
use serenade_core::types::{RequestId, UserId};
use serenade_core::user::{Testimonial, UserProfile};

use crate::repositories::{RequestRepo, TestimonialRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL error code for a CHECK constraint violation.
const PG_CHECK_VIOLATION: &str = "23514";
/// PostgreSQL error code for a unique constraint violation.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL error code for a foreign key violation.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Request, user and testimonial lookups backed by a connection pool.
#[derive(Clone)]
pub struct PgRequestStore {
    pool: DbPool,
}

impl PgRequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a sqlx error into the core taxonomy.
///
/// A CHECK violation means the merged row would break a lifecycle invariant.
pub fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(PG_CHECK_VIOLATION) => {
                return CoreError::InvalidTransition(format!(
                    "store rejected update: {}",
                    db_err.constraint().unwrap_or("check constraint")
                ));
            }
            Some(PG_UNIQUE_VIOLATION) => {
                return CoreError::Conflict(format!(
                    "duplicate value violates {}",
                    db_err.constraint().unwrap_or("unique constraint")
                ));
            }
            Some(PG_FOREIGN_KEY_VIOLATION) => {
                return CoreError::Validation(format!(
                    "referenced row does not exist ({})",
                    db_err.constraint().unwrap_or("foreign key")
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("database error: {err}"))
}

#[async_trait]
impl RequestStore for PgRequestStore {
    async fn get(&self, id: RequestId) -> Result<Option<Request>, CoreError> {
        RequestRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .map(Request::try_from)
            .transpose()
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Request>, CoreError> {
        RequestRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(Request::try_from)
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Request>, CoreError> {
        RequestRepo::list_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(Request::try_from)
            .collect()
    }

    async fn create(&self, input: &CreateRequest) -> Result<Request, CoreError> {
        if let Some(row) = RequestRepo::insert(&self.pool, input)
            .await
            .map_err(map_sqlx_error)?
        {
            return Request::try_from(row);
        }

        // The id already exists: a retried submission returns the stored row.
        let existing = self
            .get(input.id)
            .await?
            .ok_or_else(|| CoreError::request_not_found(input.id))?;
        if existing.owner_id != input.owner_id {
            return Err(CoreError::Conflict(format!(
                "request id {} is already taken",
                input.id
            )));
        }
        tracing::debug!(request_id = %input.id, "Duplicate submission returned existing request");
        Ok(existing)
    }

    async fn update(&self, id: RequestId, patch: &RequestPatch) -> Result<Request, CoreError> {
        match RequestRepo::apply_patch(&self.pool, id, patch)
            .await
            .map_err(map_sqlx_error)?
        {
            Some(row) => Request::try_from(row),
            None => match self.get(id).await? {
                None => Err(CoreError::request_not_found(id)),
                Some(current) => Err(CoreError::Conflict(format!(
                    "request {id} is at version {}, expected {:?}",
                    current.version, patch.expected_version
                ))),
            },
        }
    }
}

#[async_trait]
impl UserDirectory for PgRequestStore {
    async fn find_user(&self, id: UserId) -> Result<Option<UserProfile>, CoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .map(UserProfile::from))
    }
}

#[async_trait]
impl TestimonialSource for PgRequestStore {
    async fn list_testimonials(&self, limit: i64) -> Result<Vec<Testimonial>, CoreError> {
        Ok(TestimonialRepo::list_approved(&self.pool, limit)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(Testimonial::from)
            .collect())
    }
}
