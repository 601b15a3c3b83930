//! Request lifecycle rules.
//!
//! Every function here is pure: it inspects the current [`Request`] and
//! returns the complete [`RequestPatch`] the caller must issue as one atomic
//! store update, or a [`CoreError::InvalidTransition`]. An empty patch means
//! the request is already in the target state and nothing should be written.
//!
//! Transition table for `status`:
//! - `pending`       -> `in_production`, `completed` (media in the same update)
//! - `in_production` -> `completed` (requires final media)
//! - backward moves only with an admin correction, which clears final media
//!
//! Transition table for `payment_status`:
//! - `unpaid` -> `paid`
//! - `paid`   -> `unpaid` only with an admin override

use crate::error::CoreError;
use crate::request::{PaymentStatus, Request, RequestPatch, RequestStatus};

/// Progress reported for a customer with no requests at all.
pub const ONBOARDING_PROGRESS: u8 = 10;

/// Dashboard progress percentage for a production stage.
pub fn progress(status: RequestStatus) -> u8 {
    match status {
        RequestStatus::Pending => 25,
        RequestStatus::InProduction => 50,
        RequestStatus::Completed => 100,
    }
}

/// Plan a change of production status.
///
/// `correction` permits a backward move (an out-of-band admin fix), and only a
/// backward move clears `full_media`. A forward patch touches `status` alone,
/// so if it races a media attachment the store rejects it instead of dropping
/// the attached track.
pub fn plan_status_change(
    request: &Request,
    next: RequestStatus,
    correction: bool,
) -> Result<RequestPatch, CoreError> {
    let current = request.status;
    if current == next {
        return Ok(RequestPatch::default());
    }

    if next.stage() < current.stage() && !correction {
        return Err(CoreError::InvalidTransition(format!(
            "cannot move request {} back from {} to {}",
            request.id,
            current.name(),
            next.name()
        )));
    }

    match next {
        RequestStatus::Completed => {
            if request.full_media.is_none() {
                return Err(CoreError::InvalidTransition(format!(
                    "cannot mark request {} completed without final media",
                    request.id
                )));
            }
            Ok(RequestPatch {
                status: Some(RequestStatus::Completed),
                ..Default::default()
            })
        }
        RequestStatus::Pending | RequestStatus::InProduction => Ok(RequestPatch {
            status: Some(next),
            full_media: (next.stage() < current.stage()).then_some(None),
            ..Default::default()
        }),
    }
}

/// Plan a change of payment status.
///
/// `paid -> unpaid` is refused unless `admin_override` is set.
pub fn plan_payment_change(
    request: &Request,
    next: PaymentStatus,
    admin_override: bool,
) -> Result<RequestPatch, CoreError> {
    match (request.payment_status, next) {
        (current, next) if current == next => Ok(RequestPatch::default()),
        (PaymentStatus::Paid, PaymentStatus::Unpaid) if !admin_override => {
            Err(CoreError::InvalidTransition(format!(
                "payment for request {} is already settled and cannot revert to unpaid",
                request.id
            )))
        }
        (_, next) => Ok(RequestPatch {
            payment_status: Some(next),
            ..Default::default()
        }),
    }
}

/// Plan attaching the finished track.
///
/// Sets `full_media`, doubles it as `preview_media`, and moves the request to
/// `completed` in a single patch. Re-attaching the media already in place is
/// a no-op.
pub fn plan_media_attachment(request: &Request, media_ref: &str) -> Result<RequestPatch, CoreError> {
    let media_ref = media_ref.trim();
    if media_ref.is_empty() {
        return Err(CoreError::Validation("empty link".to_string()));
    }

    if request.status == RequestStatus::Completed
        && request.full_media.as_deref() == Some(media_ref)
    {
        return Ok(RequestPatch::default());
    }

    Ok(RequestPatch {
        status: Some(RequestStatus::Completed),
        full_media: Some(Some(media_ref.to_string())),
        preview_media: Some(Some(media_ref.to_string())),
        ..Default::default()
    })
}

/// Plan replacing the preview with a distinct excerpt.
pub fn plan_preview_change(request: &Request, media_ref: &str) -> Result<RequestPatch, CoreError> {
    let media_ref = media_ref.trim();
    if media_ref.is_empty() {
        return Err(CoreError::Validation("empty link".to_string()));
    }
    if request.preview_media.as_deref() == Some(media_ref) {
        return Ok(RequestPatch::default());
    }
    Ok(RequestPatch {
        preview_media: Some(Some(media_ref.to_string())),
        ..Default::default()
    })
}
