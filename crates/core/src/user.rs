//! Identities as seen by the workflow: profiles owned by the identity
//! provider, the acting principal, and the read-only testimonial lookup.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp, UserId};

/// Role name carried by customer tokens.
pub const ROLE_CUSTOMER: &str = "customer";

/// Role name carried by staff tokens.
pub const ROLE_ADMIN: &str = "admin";

/// A profile owned by the identity collaborator. Read for display names and
/// delivery addresses only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub contact_handle: Option<String>,
    pub created_at: Timestamp,
}

/// The principal performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer(UserId),
    Admin(UserId),
}

impl Actor {
    /// Build an actor from a token's subject and role name.
    pub fn from_role(user_id: UserId, role: &str) -> Result<Self, CoreError> {
        match role {
            ROLE_CUSTOMER => Ok(Actor::Customer(user_id)),
            ROLE_ADMIN => Ok(Actor::Admin(user_id)),
            other => Err(CoreError::Forbidden(format!("Unknown role '{other}'"))),
        }
    }

    pub fn user_id(self) -> UserId {
        match self {
            Actor::Customer(id) | Actor::Admin(id) => id,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Actor::Admin(_))
    }
}

/// A published customer testimonial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: DbId,
    pub author_name: String,
    pub quote: String,
    pub rating: i16,
    pub created_at: Timestamp,
}
