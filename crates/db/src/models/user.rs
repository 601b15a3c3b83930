//! User rows.

use serenade_core::types::{DbId, Timestamp};
use serenade_core::user::UserProfile;
use serde::Deserialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub contact_handle: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            id: row.id,
            name: row.name,
            email: row.email,
            contact_handle: row.contact_handle,
            created_at: row.created_at,
        }
    }
}

/// DTO for mirroring a user from the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub contact_handle: Option<String>,
    pub role: Option<String>,
}
