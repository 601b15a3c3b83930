//! Serenade change feed and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; the push half of every read model's refresh.
//! - [`RequestEvent`]: the envelope published for every applied change.
//! - [`FeedScope`]: owner-scoped or admin-wide subscription filter.
//! - [`EventPersistence`]: background service writing every event to the
//!   `request_events` audit table.
//! - [`delivery`]: outbound notifier implementations (SMTP, log-only).

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{EventBus, FeedScope, RequestEvent, RequestEventKind};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::LogNotifier;
pub use persistence::EventPersistence;
