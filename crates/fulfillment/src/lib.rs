//! Admin-side fulfillment of song requests.
//!
//! - [`FulfillmentCoordinator`]: the only writer of lifecycle state. Each
//!   operation validates, plans one patch and issues one store update.
//! - [`ReconciliationLoop`]: keeps a [`ReadModel`](serenade_core::reconcile::ReadModel)
//!   fresh from the change feed plus a periodic poll.
//! - [`LocalMediaStorage`]: filesystem-backed media uploads.

pub mod config;
pub mod coordinator;
pub mod media_storage;
pub mod sync;

pub use config::FulfillmentConfig;
pub use coordinator::FulfillmentCoordinator;
pub use media_storage::LocalMediaStorage;
pub use sync::ReconciliationLoop;
