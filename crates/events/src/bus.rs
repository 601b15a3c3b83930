//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the change feed for request records. It is shared via
//! `Arc<EventBus>`; subscribers filter with a [`FeedScope`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenade_core::request::Request;
use serenade_core::types::{RequestId, UserId};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RequestEvent
// ---------------------------------------------------------------------------

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestEventKind {
    Created,
    StatusChanged,
    PaymentChanged,
    MediaAttached,
    PreviewChanged,
    DetailsAttached,
    DeliveryRequested,
}

impl RequestEventKind {
    /// Dot-separated event name stored in the audit log.
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Created => "request.created",
            Self::StatusChanged => "request.status_changed",
            Self::PaymentChanged => "request.payment_changed",
            Self::MediaAttached => "request.media_attached",
            Self::PreviewChanged => "request.preview_changed",
            Self::DetailsAttached => "request.details_attached",
            Self::DeliveryRequested => "request.delivery_requested",
        }
    }
}

/// A change applied to one request.
///
/// Constructed via [`RequestEvent::for_request`] and enriched with
/// [`with_actor`](RequestEvent::with_actor) and
/// [`with_payload`](RequestEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEvent {
    pub kind: RequestEventKind,
    pub request_id: RequestId,
    /// Owner of the request; drives customer-scoped feeds.
    pub owner_id: UserId,
    /// Who caused the change, when known.
    pub actor_user_id: Option<UserId>,
    /// Store version after the change.
    pub version: i64,
    /// Free-form JSON carrying event-specific data.
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl RequestEvent {
    /// Describe a change to `request` (already in its post-change state).
    pub fn for_request(kind: RequestEventKind, request: &Request) -> Self {
        Self {
            kind,
            request_id: request.id,
            owner_id: request.owner_id,
            actor_user_id: None,
            version: request.version,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, user_id: UserId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// FeedScope
// ---------------------------------------------------------------------------

/// Which slice of the feed a subscriber cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// One customer's own requests.
    Owner(UserId),
    /// Every admin-visible request.
    Admin,
}

impl FeedScope {
    pub fn matches(self, event: &RequestEvent) -> bool {
        self.covers(event.owner_id)
    }

    pub fn matches_request(self, request: &Request) -> bool {
        self.covers(request.owner_id)
    }

    fn covers(self, owner_id: UserId) -> bool {
        match self {
            FeedScope::Owner(owner) => owner_id == owner,
            FeedScope::Admin => true,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use serenade_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// # drop(rx);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RequestEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`. The periodic poll in
    /// the reconciliation loop covers whatever a lagging receiver missed.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: RequestEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to every event published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
