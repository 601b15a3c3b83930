//! Media access gating.
//!
//! The engine decides *whether* a customer may hear a preview or the full
//! track; bounding preview playback length is the player's job.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::progress;
use crate::request::{PaymentStatus, Request, RequestStatus};
use crate::types::{MediaRef, RequestId, Timestamp};
use crate::user::Actor;

/// Derived permission for what media a customer may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    NoAccess,
    PreviewOnly,
    FullAccess,
}

/// Resolve the access level from the two state axes and preview presence.
///
/// `FullAccess` iff completed and paid. Otherwise a preview, when one exists,
/// may be streamed; with nothing playable the level is `NoAccess`.
pub fn access_level(
    status: RequestStatus,
    payment: PaymentStatus,
    has_preview: bool,
) -> AccessLevel {
    match (status, payment) {
        (RequestStatus::Completed, PaymentStatus::Paid) => AccessLevel::FullAccess,
        _ if has_preview => AccessLevel::PreviewOnly,
        _ => AccessLevel::NoAccess,
    }
}

impl Request {
    pub fn access_level(&self) -> AccessLevel {
        access_level(
            self.status,
            self.payment_status,
            self.preview_media.is_some(),
        )
    }
}

/// Which artifact a caller wants to play or download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Preview,
    Full,
}

/// Customer read paths must own the request; admins bypass ownership.
pub fn ensure_can_read(actor: Actor, request: &Request) -> Result<(), CoreError> {
    match actor {
        Actor::Admin(_) => Ok(()),
        Actor::Customer(id) if id == request.owner_id => Ok(()),
        Actor::Customer(_) => Err(CoreError::NotOwner {
            request_id: request.id,
        }),
    }
}

/// Return the artifact `actor` may consume, or an access denial.
pub fn resolve_media(actor: Actor, request: &Request, kind: MediaKind) -> Result<&MediaRef, CoreError> {
    ensure_can_read(actor, request)?;

    let level = if actor.is_admin() {
        AccessLevel::FullAccess
    } else {
        request.access_level()
    };

    let artifact = match kind {
        MediaKind::Preview if level >= AccessLevel::PreviewOnly => request.preview_media.as_ref(),
        MediaKind::Full if level == AccessLevel::FullAccess => request.full_media.as_ref(),
        MediaKind::Full if request.status == RequestStatus::Completed => {
            return Err(CoreError::AccessDenied(
                "payment is required to unlock the full track".to_string(),
            ));
        }
        _ => None,
    };

    artifact.ok_or_else(|| CoreError::AccessDenied("the track is not ready yet".to_string()))
}

// ---------------------------------------------------------------------------
// Customer projection
// ---------------------------------------------------------------------------

/// What a customer dashboard renders for one request. Media references are
/// only present when the access level allows them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestView {
    pub id: RequestId,
    pub honoree_name: String,
    pub genre: String,
    pub tone: String,
    pub voice: String,
    pub status: RequestStatus,
    pub payment_status: PaymentStatus,
    pub progress: u8,
    pub access_level: AccessLevel,
    pub preview_media: Option<MediaRef>,
    pub full_media: Option<MediaRef>,
    pub created_at: Timestamp,
}

impl RequestView {
    /// Project `request` for `actor`, enforcing ownership.
    pub fn for_actor(actor: Actor, request: &Request) -> Result<Self, CoreError> {
        ensure_can_read(actor, request)?;
        let visible = |kind| resolve_media(actor, request, kind).ok().cloned();

        Ok(Self {
            id: request.id,
            honoree_name: request.honoree_name.clone(),
            genre: request.genre.clone(),
            tone: request.tone.clone(),
            voice: request.voice.clone(),
            status: request.status,
            payment_status: request.payment_status,
            progress: progress(request.status),
            access_level: request.access_level(),
            preview_media: visible(MediaKind::Preview),
            full_media: visible(MediaKind::Full),
            created_at: request.created_at,
        })
    }
}
