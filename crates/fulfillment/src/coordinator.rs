//! Admin operations that mutate request state.
//!
//! Every operation follows the same shape: authorize the actor, load the
//! current record, let the lifecycle rules plan one patch, and issue it as a
//! single atomic store update. An empty plan writes nothing, so retrying an
//! operation with the same arguments is safe. Applied changes are published
//! on the event bus when one is attached.

use std::sync::Arc;

use serde_json::json;
use serenade_core::delivery::{build_delivery_intent, DeliveryIntent};
use serenade_core::error::CoreError;
use serenade_core::lifecycle::{
    plan_media_attachment, plan_payment_change, plan_preview_change, plan_status_change,
};
use serenade_core::media_link::{LinkVerdict, MediaLinkValidator};
use serenade_core::ports::{
    require_request, require_user, MediaStorage, Notifier, RequestStore, UserDirectory,
};
use serenade_core::request::{
    CreateRequest, PaymentStatus, Request, RequestDetails, RequestPatch, RequestStatus,
};
use serenade_core::types::{new_request_id, RequestId, UserId};
use serenade_core::user::Actor;
use serenade_events::{EventBus, RequestEvent, RequestEventKind};

/// Maximum length of an admin technical-details annex.
const MAX_TECHNICAL_DETAILS_LEN: usize = 10_000;

pub struct FulfillmentCoordinator {
    store: Arc<dyn RequestStore>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
    validator: MediaLinkValidator,
    media: Option<Arc<dyn MediaStorage>>,
    events: Option<Arc<EventBus>>,
}

impl FulfillmentCoordinator {
    pub fn new(
        store: Arc<dyn RequestStore>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            users,
            notifier,
            validator: MediaLinkValidator::default(),
            media: None,
            events: None,
        }
    }

    pub fn with_validator(mut self, validator: MediaLinkValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_media_storage(mut self, media: Arc<dyn MediaStorage>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn validator(&self) -> &MediaLinkValidator {
        &self.validator
    }

    // -----------------------------------------------------------------------
    // Customer submission
    // -----------------------------------------------------------------------

    /// Create a request for `owner`. A client-minted `id` makes retries
    /// return the stored row instead of creating a duplicate.
    pub async fn submit_request(
        &self,
        owner: UserId,
        id: Option<RequestId>,
        details: RequestDetails,
    ) -> Result<Request, CoreError> {
        details.validate_submission()?;
        let input = CreateRequest {
            id: id.unwrap_or_else(new_request_id),
            owner_id: owner,
            details,
        };
        let created = self.store.create(&input).await?;
        tracing::info!(request_id = %created.id, owner_id = owner, "Request submitted");
        self.publish(
            RequestEvent::for_request(RequestEventKind::Created, &created).with_actor(owner),
        );
        Ok(created)
    }

    // -----------------------------------------------------------------------
    // Media
    // -----------------------------------------------------------------------

    /// Attach the finished track and complete the request in one update.
    ///
    /// A link that needs confirmation is refused with
    /// [`CoreError::UnvalidatedMedia`] unless `force` is set. An empty link is
    /// refused regardless.
    pub async fn attach_final_media(
        &self,
        actor: Actor,
        id: RequestId,
        media_ref: &str,
        force: bool,
    ) -> Result<Request, CoreError> {
        let admin = require_admin(actor)?;
        self.check_link(id, media_ref, force)?;

        let current = require_request(self.store.as_ref(), id).await?;
        let patch = plan_media_attachment(&current, media_ref)?;
        let payload = json!({ "media_ref": media_ref.trim(), "forced": force });
        self.apply(admin, current, patch, RequestEventKind::MediaAttached, payload)
            .await
    }

    /// Replace the preview with a distinct excerpt.
    pub async fn set_preview_media(
        &self,
        actor: Actor,
        id: RequestId,
        media_ref: &str,
        force: bool,
    ) -> Result<Request, CoreError> {
        let admin = require_admin(actor)?;
        self.check_link(id, media_ref, force)?;

        let current = require_request(self.store.as_ref(), id).await?;
        let patch = plan_preview_change(&current, media_ref)?;
        let payload = json!({ "media_ref": media_ref.trim(), "forced": force });
        self.apply(admin, current, patch, RequestEventKind::PreviewChanged, payload)
            .await
    }

    /// Store uploaded bytes and attach the resulting URL as the final track.
    pub async fn upload_final_media(
        &self,
        actor: Actor,
        id: RequestId,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<Request, CoreError> {
        require_admin(actor)?;
        let media = self
            .media
            .as_ref()
            .ok_or_else(|| CoreError::Internal("media storage is not configured".to_string()))?;
        if bytes.is_empty() {
            return Err(CoreError::Validation("uploaded file is empty".to_string()));
        }

        // Fail before writing anything for unknown requests.
        require_request(self.store.as_ref(), id).await?;

        let path = format!("requests/{id}/{}", sanitize_file_name(file_name));
        if !self.validator.validate(&media.public_url(&path)).is_ok() {
            return Err(CoreError::Validation(format!(
                "'{file_name}' is not a supported audio file"
            )));
        }

        let url = media.upload(bytes, &path).await?;
        self.attach_final_media(actor, id, &url, false).await
    }

    // -----------------------------------------------------------------------
    // Status and payment
    // -----------------------------------------------------------------------

    /// Move the production status. `correction` allows a backward move,
    /// which also clears the final media. A forward move that loses a race
    /// with a media attachment fails with `InvalidTransition`.
    pub async fn set_status(
        &self,
        actor: Actor,
        id: RequestId,
        status: RequestStatus,
        correction: bool,
    ) -> Result<Request, CoreError> {
        let admin = require_admin(actor)?;
        let current = require_request(self.store.as_ref(), id).await?;
        let patch = plan_status_change(&current, status, correction)?;

        let backward = status.stage() < current.status.stage();
        if backward && !patch.is_empty() {
            tracing::warn!(
                request_id = %id,
                admin_id = admin,
                from = current.status.name(),
                to = status.name(),
                "Admin status correction"
            );
        }

        let payload = json!({
            "from": current.status.name(),
            "to": status.name(),
            "correction": correction,
        });
        self.apply(admin, current, patch, RequestEventKind::StatusChanged, payload)
            .await
    }

    /// Change the payment status. Reverting a paid request needs
    /// `admin_override` and is logged.
    pub async fn set_payment(
        &self,
        actor: Actor,
        id: RequestId,
        payment: PaymentStatus,
        admin_override: bool,
    ) -> Result<Request, CoreError> {
        let admin = require_admin(actor)?;
        let current = require_request(self.store.as_ref(), id).await?;
        let patch = plan_payment_change(&current, payment, admin_override)?;

        let reverted = current.payment_status == PaymentStatus::Paid
            && payment == PaymentStatus::Unpaid;
        if reverted {
            tracing::warn!(request_id = %id, admin_id = admin, "Admin payment override: paid -> unpaid");
        }

        let payload = json!({
            "from": current.payment_status.name(),
            "to": payment.name(),
            "override": reverted,
        });
        self.apply(admin, current, patch, RequestEventKind::PaymentChanged, payload)
            .await
    }

    /// Record that payment was confirmed by the payment provider.
    ///
    /// Unlike [`set_payment`](Self::set_payment) this carries no admin actor
    /// and can only move a request to `paid`.
    pub async fn confirm_payment(&self, id: RequestId) -> Result<Request, CoreError> {
        let current = require_request(self.store.as_ref(), id).await?;
        let patch = plan_payment_change(&current, PaymentStatus::Paid, false)?;
        if patch.is_empty() {
            return Ok(current);
        }
        let updated = self.store.update(id, &patch).await?;
        tracing::info!(request_id = %id, "Payment confirmed");
        self.publish(
            RequestEvent::for_request(RequestEventKind::PaymentChanged, &updated)
                .with_payload(json!({ "from": "unpaid", "to": "paid", "source": "provider" })),
        );
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Technical details
    // -----------------------------------------------------------------------

    pub async fn attach_technical_details(
        &self,
        actor: Actor,
        id: RequestId,
        text: &str,
    ) -> Result<Request, CoreError> {
        let admin = require_admin(actor)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation(
                "technical details must not be empty".to_string(),
            ));
        }
        if text.len() > MAX_TECHNICAL_DETAILS_LEN {
            return Err(CoreError::Validation(format!(
                "technical details must be at most {MAX_TECHNICAL_DETAILS_LEN} bytes"
            )));
        }

        let current = require_request(self.store.as_ref(), id).await?;
        let patch = if current.technical_details.as_deref() == Some(text) {
            RequestPatch::default()
        } else {
            RequestPatch {
                technical_details: Some(text.to_string()),
                ..Default::default()
            }
        };
        let payload = json!({ "length": text.len() });
        self.apply(admin, current, patch, RequestEventKind::DetailsAttached, payload)
            .await
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    /// Resolve the delivery intent for a completed, paid request.
    pub async fn request_delivery(
        &self,
        actor: Actor,
        id: RequestId,
    ) -> Result<DeliveryIntent, CoreError> {
        require_admin(actor)?;
        let current = require_request(self.store.as_ref(), id).await?;
        let owner = require_user(self.users.as_ref(), current.owner_id).await?;
        build_delivery_intent(&current, &owner)
    }

    /// Build the intent and hand it to the notifier once.
    pub async fn deliver(&self, actor: Actor, id: RequestId) -> Result<DeliveryIntent, CoreError> {
        let admin = require_admin(actor)?;
        let intent = self.request_delivery(actor, id).await?;
        self.notifier.send(&intent).await?;

        tracing::info!(request_id = %id, dedupe_key = %intent.dedupe_key, "Delivery handed to notifier");
        if let Some(current) = self.store.get(id).await? {
            self.publish(
                RequestEvent::for_request(RequestEventKind::DeliveryRequested, &current)
                    .with_actor(admin)
                    .with_payload(json!({ "dedupe_key": intent.dedupe_key })),
            );
        }
        Ok(intent)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check_link(&self, id: RequestId, media_ref: &str, force: bool) -> Result<(), CoreError> {
        match self.validator.validate(media_ref) {
            LinkVerdict::Accepted(_) => Ok(()),
            LinkVerdict::Rejected(reason) => Err(CoreError::Validation(reason)),
            LinkVerdict::NeedsConfirmation(reason) if force => {
                tracing::warn!(request_id = %id, %reason, "Media link accepted by admin override");
                Ok(())
            }
            LinkVerdict::NeedsConfirmation(reason) => Err(CoreError::UnvalidatedMedia { reason }),
        }
    }

    async fn apply(
        &self,
        admin: UserId,
        current: Request,
        patch: RequestPatch,
        kind: RequestEventKind,
        payload: serde_json::Value,
    ) -> Result<Request, CoreError> {
        if patch.is_empty() {
            tracing::debug!(request_id = %current.id, event = kind.event_type(), "No-op, request already in target state");
            return Ok(current);
        }
        let updated = self.store.update(current.id, &patch).await?;
        tracing::info!(
            request_id = %updated.id,
            admin_id = admin,
            version = updated.version,
            event = kind.event_type(),
            "Request updated"
        );
        self.publish(
            RequestEvent::for_request(kind, &updated)
                .with_actor(admin)
                .with_payload(payload),
        );
        Ok(updated)
    }

    fn publish(&self, event: RequestEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

fn require_admin(actor: Actor) -> Result<UserId, CoreError> {
    match actor {
        Actor::Admin(id) => Ok(id),
        Actor::Customer(_) => Err(CoreError::Forbidden(
            "admin role required for fulfillment operations".to_string(),
        )),
    }
}

/// Keep the last path segment and replace anything outside a safe charset.
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
