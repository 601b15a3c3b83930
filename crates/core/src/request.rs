//! The song request entity, its two state axes, and the atomic patch shape
//! every mutation is expressed in.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{MediaRef, RequestId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// State axes
// ---------------------------------------------------------------------------

/// Production-stage axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProduction,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::Pending,
        RequestStatus::InProduction,
        RequestStatus::Completed,
    ];

    /// Position along the forward-only production line.
    pub fn stage(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProduction => 1,
            Self::Completed => 2,
        }
    }

    /// Database `status` column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProduction => "in_production",
            Self::Completed => "completed",
        }
    }

    /// Parse from the database `status` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "pending" => Ok(Self::Pending),
            "in_production" => Ok(Self::InProduction),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown request status '{other}'"
            ))),
        }
    }
}

/// Monetary axis, independent of [`RequestStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 2] = [PaymentStatus::Unpaid, PaymentStatus::Paid];

    /// Database `payment_status` column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }

    /// Parse from the database `payment_status` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            other => Err(CoreError::Validation(format!(
                "Unknown payment status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One customer's order for a personalized song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub owner_id: UserId,
    pub status: RequestStatus,
    pub payment_status: PaymentStatus,
    pub preview_media: Option<MediaRef>,
    pub full_media: Option<MediaRef>,
    pub honoree_name: String,
    pub story: String,
    pub genre: String,
    pub tone: String,
    pub voice: String,
    pub include_names: bool,
    pub names_to_include: Option<String>,
    pub cover_image_ref: Option<String>,
    pub technical_details: Option<String>,
    /// Update sequence assigned by the store; starts at 1.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Request {
    /// Build the initial record for a submission.
    pub fn from_submission(input: &CreateRequest, now: Timestamp) -> Self {
        Self {
            id: input.id,
            owner_id: input.owner_id,
            status: RequestStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            preview_media: None,
            full_media: None,
            honoree_name: input.details.honoree_name.trim().to_string(),
            story: input.details.story.trim().to_string(),
            genre: input.details.genre.clone(),
            tone: input.details.tone.clone(),
            voice: input.details.voice.clone(),
            include_names: input.details.include_names,
            names_to_include: input.details.names_to_include.clone(),
            cover_image_ref: input.details.cover_image_ref.clone(),
            technical_details: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record-level invariants that must hold after every write.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if self.full_media.is_some() && self.status != RequestStatus::Completed {
            return Err(CoreError::InvalidTransition(format!(
                "request {} would carry final media while {}",
                self.id,
                self.status.name()
            )));
        }
        Ok(())
    }

    /// Apply `patch` as one atomic update, bumping `version`.
    ///
    /// Fails with [`CoreError::Conflict`] when the patch pins a version that
    /// no longer matches, and with [`CoreError::InvalidTransition`] when the
    /// merged record would break an invariant. `self` is left untouched on
    /// failure.
    pub fn apply_patch(&self, patch: &RequestPatch, now: Timestamp) -> Result<Request, CoreError> {
        if let Some(expected) = patch.expected_version {
            if expected != self.version {
                return Err(CoreError::Conflict(format!(
                    "request {} is at version {}, expected {expected}",
                    self.id, self.version
                )));
            }
        }

        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(payment) = patch.payment_status {
            next.payment_status = payment;
        }
        if let Some(preview) = &patch.preview_media {
            next.preview_media = preview.clone();
        }
        if let Some(full) = &patch.full_media {
            next.full_media = full.clone();
        }
        if let Some(details) = &patch.technical_details {
            next.technical_details = Some(details.clone());
        }
        next.check_invariants()?;

        next.version = self.version + 1;
        next.updated_at = now;
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Submission DTOs
// ---------------------------------------------------------------------------

/// Descriptive attributes supplied by the customer at submission.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RequestDetails {
    #[validate(length(min = 1, max = 120, message = "honoree name must be 1-120 characters"))]
    pub honoree_name: String,
    #[validate(length(min = 1, max = 5000, message = "story must be 1-5000 characters"))]
    pub story: String,
    #[validate(length(min = 1, max = 60))]
    pub genre: String,
    #[validate(length(min = 1, max = 60))]
    pub tone: String,
    #[validate(length(min = 1, max = 60))]
    pub voice: String,
    #[serde(default)]
    pub include_names: bool,
    #[validate(length(max = 500))]
    pub names_to_include: Option<String>,
    pub cover_image_ref: Option<String>,
}

impl RequestDetails {
    /// Run field validation and the cross-field name rule.
    pub fn validate_submission(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        if self.honoree_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "honoree name must not be blank".to_string(),
            ));
        }
        if self.include_names
            && self
                .names_to_include
                .as_deref()
                .map_or(true, |n| n.trim().is_empty())
        {
            return Err(CoreError::Validation(
                "names_to_include is required when include_names is set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything the store needs to create a request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Client-minted id; creating the same id twice returns the existing row.
    pub id: RequestId,
    pub owner_id: UserId,
    pub details: RequestDetails,
}

// ---------------------------------------------------------------------------
// RequestPatch
// ---------------------------------------------------------------------------

/// Partial update applied atomically by the store.
///
/// Media fields use `Option<Option<_>>`: the outer `None` leaves the column
/// alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestPatch {
    pub status: Option<RequestStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub preview_media: Option<Option<MediaRef>>,
    pub full_media: Option<Option<MediaRef>>,
    pub technical_details: Option<String>,
    /// When set, the store refuses the update unless the row is at this
    /// version.
    pub expected_version: Option<i64>,
}

impl RequestPatch {
    /// A patch that would not change any field.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_status.is_none()
            && self.preview_media.is_none()
            && self.full_media.is_none()
            && self.technical_details.is_none()
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::fixtures::*;
    use super::*;

    #[test]
    fn status_names_round_trip() {
        for s in RequestStatus::ALL {
            assert_eq!(RequestStatus::from_name(s.name()).unwrap(), s);
        }
        for p in PaymentStatus::ALL {
            assert_eq!(PaymentStatus::from_name(p.name()).unwrap(), p);
        }
        assert!(RequestStatus::from_name("done").is_err());
        assert!(PaymentStatus::from_name("").is_err());
    }

    #[test]
    fn new_submission_starts_pending_and_unpaid() {
        let r = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        assert_eq!(r.version, 1);
        assert!(r.full_media.is_none());
        assert!(r.preview_media.is_none());
        assert!(r.check_invariants().is_ok());
    }

    #[test]
    fn apply_patch_bumps_version_and_timestamp() {
        let r = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        let patch = RequestPatch {
            status: Some(RequestStatus::InProduction),
            ..Default::default()
        };
        let next = r.apply_patch(&patch, at(60)).unwrap();
        assert_eq!(next.status, RequestStatus::InProduction);
        assert_eq!(next.version, 2);
        assert_eq!(next.updated_at, at(60));
        assert_eq!(next.created_at, r.created_at);
    }

    #[test]
    fn apply_patch_rejects_media_on_unfinished_request() {
        let r = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        let patch = RequestPatch {
            full_media: Some(Some("a.mp3".to_string())),
            ..Default::default()
        };
        assert_matches!(
            r.apply_patch(&patch, at(1)),
            Err(CoreError::InvalidTransition(_))
        );
    }

    #[test]
    fn apply_patch_honours_expected_version() {
        let r = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        let patch = RequestPatch {
            payment_status: Some(PaymentStatus::Paid),
            expected_version: Some(5),
            ..Default::default()
        };
        assert_matches!(r.apply_patch(&patch, at(1)), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn clearing_media_uses_inner_none() {
        let r = request(RequestStatus::Completed, PaymentStatus::Unpaid, 0);
        let patch = RequestPatch {
            status: Some(RequestStatus::InProduction),
            full_media: Some(None),
            ..Default::default()
        };
        let next = r.apply_patch(&patch, at(1)).unwrap();
        assert!(next.full_media.is_none());
        assert!(next.preview_media.is_some());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(RequestPatch::default().is_empty());
        let pinned = RequestPatch {
            expected_version: Some(1),
            ..Default::default()
        };
        assert!(pinned.is_empty());
    }

    #[test]
    fn submission_requires_names_when_requested() {
        let mut d = details();
        assert!(d.validate_submission().is_ok());
        d.include_names = true;
        assert_matches!(d.validate_submission(), Err(CoreError::Validation(_)));
        d.names_to_include = Some("Rosa, Tito".to_string());
        assert!(d.validate_submission().is_ok());
    }

    #[test]
    fn submission_rejects_blank_honoree() {
        let mut d = details();
        d.honoree_name = "   ".to_string();
        assert!(d.validate_submission().is_err());
        d.honoree_name = String::new();
        assert!(d.validate_submission().is_err());
    }
}
