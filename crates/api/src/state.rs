use std::sync::Arc;

use serenade_core::ports::{RequestStore, TestimonialSource};
use serenade_fulfillment::{FulfillmentCoordinator, ReconciliationLoop};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database pool, when running against Postgres. Only the health check
    /// touches it directly.
    pub pool: Option<serenade_db::DbPool>,
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn RequestStore>,
    pub testimonials: Arc<dyn TestimonialSource>,
    pub coordinator: Arc<FulfillmentCoordinator>,
    /// Admin-wide read model, kept fresh by its background loop.
    pub admin_board: Arc<ReconciliationLoop>,
}
