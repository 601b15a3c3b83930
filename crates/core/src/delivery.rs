//! Delivery intents handed to the notifier.
//!
//! Building an intent is the only place delivery is *permitted*; sending is
//! the notifier's concern.

use serde::{Deserialize, Serialize};

use crate::access::AccessLevel;
use crate::error::CoreError;
use crate::request::{PaymentStatus, Request};
use crate::types::{MediaRef, RequestId, UserId};
use crate::user::UserProfile;

/// Resolved addressee of a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

/// A resolved (recipient, artifact) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryIntent {
    pub request_id: RequestId,
    pub recipient: Recipient,
    pub honoree_name: String,
    pub artifact: MediaRef,
    /// Stable across retries for the same request and artifact, so a
    /// notifier can drop duplicates.
    pub dedupe_key: String,
}

/// Build the intent for `request`, addressed to `owner`.
///
/// Refused unless the request is completed, paid, and carries final media,
/// regardless of what any UI believes.
pub fn build_delivery_intent(
    request: &Request,
    owner: &UserProfile,
) -> Result<DeliveryIntent, CoreError> {
    if request.payment_status != PaymentStatus::Paid {
        return Err(CoreError::AccessDenied(format!(
            "delivery of request {} requires payment",
            request.id
        )));
    }
    if request.access_level() != AccessLevel::FullAccess {
        return Err(CoreError::AccessDenied(format!(
            "request {} is not completed yet",
            request.id
        )));
    }
    let artifact = request.full_media.clone().ok_or_else(|| {
        CoreError::Internal(format!("completed request {} has no final media", request.id))
    })?;
    if owner.id != request.owner_id {
        return Err(CoreError::Internal(format!(
            "resolved user {} does not own request {}",
            owner.id, request.id
        )));
    }
    if owner.email.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "owner of request {} has no email address",
            request.id
        )));
    }

    Ok(DeliveryIntent {
        request_id: request.id,
        recipient: Recipient {
            user_id: owner.id,
            name: owner.name.clone(),
            email: owner.email.clone(),
        },
        honoree_name: request.honoree_name.clone(),
        dedupe_key: format!("{}:{}", request.id, artifact),
        artifact,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::request::fixtures::{at, request};
    use crate::request::RequestStatus;

    fn owner(id: UserId) -> UserProfile {
        UserProfile {
            id,
            name: "Marta".to_string(),
            email: "marta@example.com".to_string(),
            contact_handle: None,
            created_at: at(0),
        }
    }

    #[test]
    fn paid_completed_request_yields_intent() {
        let r = request(RequestStatus::Completed, PaymentStatus::Paid, 0);
        let intent = build_delivery_intent(&r, &owner(r.owner_id)).unwrap();
        assert_eq!(intent.recipient.email, "marta@example.com");
        assert_eq!(Some(&intent.artifact), r.full_media.as_ref());
        assert!(intent.dedupe_key.starts_with(&r.id.to_string()));
    }

    #[test]
    fn unpaid_request_is_refused() {
        let r = request(RequestStatus::Completed, PaymentStatus::Unpaid, 0);
        assert_matches!(
            build_delivery_intent(&r, &owner(r.owner_id)),
            Err(CoreError::AccessDenied(msg)) if msg.contains("payment")
        );
    }

    #[test]
    fn paid_but_unfinished_request_is_refused() {
        let r = request(RequestStatus::InProduction, PaymentStatus::Paid, 0);
        assert_matches!(
            build_delivery_intent(&r, &owner(r.owner_id)),
            Err(CoreError::AccessDenied(_))
        );
    }

    #[test]
    fn intent_is_stable_across_retries() {
        let r = request(RequestStatus::Completed, PaymentStatus::Paid, 0);
        let a = build_delivery_intent(&r, &owner(r.owner_id)).unwrap();
        let b = build_delivery_intent(&r, &owner(r.owner_id)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_profile_is_an_internal_error() {
        let r = request(RequestStatus::Completed, PaymentStatus::Paid, 0);
        assert_matches!(
            build_delivery_intent(&r, &owner(r.owner_id + 1)),
            Err(CoreError::Internal(_))
        );
    }
}
