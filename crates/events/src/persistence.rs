//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and appends every [`RequestEvent`] to the `request_events` table. It
//! exits once the bus is dropped.

use serenade_core::types::DbId;
use serenade_db::models::event::CreateRequestEvent;
use serenade_db::repositories::EventRepo;
use serenade_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::RequestEvent;

/// Background service that writes request events to the audit log.
pub struct EventPersistence;

impl EventPersistence {
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<RequestEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = event.kind.event_type(),
                            request_id = %event.request_id,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &RequestEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &CreateRequestEvent {
                event_type: event.kind.event_type(),
                request_id: event.request_id,
                owner_id: event.owner_id,
                actor_user_id: event.actor_user_id,
                version: event.version,
                payload: &event.payload,
            },
        )
        .await
    }
}
