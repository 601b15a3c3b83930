//! Repository for the `users` table.

use serenade_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UserRow};

const COLUMNS: &str = "id, name, email, contact_handle, role, created_at";

/// Read access to mirrored identity profiles.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user mirrored from the identity provider.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, contact_handle, role) \
             VALUES ($1, $2, $3, COALESCE($4, 'customer')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.contact_handle)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
