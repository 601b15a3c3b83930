//! Shared fixtures for the fulfillment integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serenade_core::delivery::DeliveryIntent;
use serenade_core::error::CoreError;
use serenade_core::ports::Notifier;
use serenade_core::request::RequestDetails;
use serenade_core::user::{Actor, UserProfile};
use serenade_db::{InMemoryRequestStore, InMemoryUserDirectory};
use serenade_events::EventBus;
use serenade_fulfillment::FulfillmentCoordinator;

pub const OWNER_ID: i64 = 7;
pub const ADMIN: Actor = Actor::Admin(1);

/// Notifier that remembers every intent it was handed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<DeliveryIntent>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, intent: &DeliveryIntent) -> Result<(), CoreError> {
        self.sent.lock().unwrap().push(intent.clone());
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<InMemoryRequestStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub notifier: Arc<RecordingNotifier>,
    pub bus: Arc<EventBus>,
    pub coordinator: FulfillmentCoordinator,
}

pub async fn harness() -> Harness {
    let store = Arc::new(InMemoryRequestStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let bus = Arc::new(EventBus::default());

    users
        .insert_user(UserProfile {
            id: OWNER_ID,
            name: "Marta".to_string(),
            email: "marta@example.com".to_string(),
            contact_handle: Some("@marta".to_string()),
            created_at: Utc::now(),
        })
        .await;

    let coordinator = FulfillmentCoordinator::new(store.clone(), users.clone(), notifier.clone())
        .with_event_bus(bus.clone());

    Harness {
        store,
        users,
        notifier,
        bus,
        coordinator,
    }
}

pub fn details() -> RequestDetails {
    RequestDetails {
        honoree_name: "Papa Joe".to_string(),
        story: "Forty years of fishing trips".to_string(),
        genre: "country".to_string(),
        tone: "nostalgic".to_string(),
        voice: "male".to_string(),
        include_names: false,
        names_to_include: None,
        cover_image_ref: None,
    }
}
