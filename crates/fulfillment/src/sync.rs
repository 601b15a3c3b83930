//! Keeps a read model in step with the store.
//!
//! Two triggers feed the same idempotent merge: the change feed (push) and a
//! fixed poll (pull). A feed event refreshes the affected record right away
//! and pushes the next poll back by a full interval. A lagged or closed feed
//! degrades to polling only.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serenade_core::error::CoreError;
use serenade_core::ports::RequestStore;
use serenade_core::reconcile::ReadModel;
use serenade_core::request::Request;
use serenade_events::{FeedScope, RequestEvent};
use tokio::sync::{broadcast, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default lifetime of an unconfirmed optimistic record.
pub const DEFAULT_OPTIMISTIC_TIMEOUT_SECS: i64 = 120;

pub struct ReconciliationLoop {
    store: Arc<dyn RequestStore>,
    scope: FeedScope,
    interval: Duration,
    timeout: chrono::Duration,
    model: Arc<RwLock<ReadModel>>,
}

impl ReconciliationLoop {
    pub fn new(store: Arc<dyn RequestStore>, scope: FeedScope) -> Self {
        Self {
            store,
            scope,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: chrono::Duration::seconds(DEFAULT_OPTIMISTIC_TIMEOUT_SECS),
            model: Arc::new(RwLock::new(ReadModel::new())),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: chrono::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shared handle to the read model this loop maintains.
    pub fn model(&self) -> Arc<RwLock<ReadModel>> {
        Arc::clone(&self.model)
    }

    /// Confirm a write response into the model. An unprimed model is left
    /// for the next refresh to fill in full.
    pub async fn fold(&self, request: Request) {
        let mut model = self.model.write().await;
        if !model.is_empty() && self.scope.matches_request(&request) {
            model.confirm(request);
        }
    }

    /// Pull the scoped listing and merge it. Returns the timeout warnings
    /// raised by the merge, each already logged.
    pub async fn refresh(&self) -> Result<Vec<CoreError>, CoreError> {
        let remote = self.fetch_scoped().await?;
        let warnings = self
            .model
            .write()
            .await
            .merge_remote(remote, Utc::now(), self.timeout);
        for warning in &warnings {
            tracing::warn!(scope = ?self.scope, warning = %warning, "Optimistic record dropped");
        }
        Ok(warnings)
    }

    /// Refresh the single record an event refers to.
    pub async fn apply_event(&self, event: &RequestEvent) -> Result<(), CoreError> {
        if !self.scope.matches(event) {
            return Ok(());
        }
        match self.store.get(event.request_id).await? {
            Some(request) => self.model.write().await.confirm(request),
            None => {
                tracing::debug!(request_id = %event.request_id, "Event for unknown request, falling back to full refresh");
                self.refresh().await?;
            }
        }
        Ok(())
    }

    /// Drive the loop until `cancel` fires. Holding an `Arc` lets request
    /// handlers share the model and trigger refreshes while the loop runs.
    pub async fn run(
        self: Arc<Self>,
        mut feed: broadcast::Receiver<RequestEvent>,
        cancel: CancellationToken,
    ) {
        tracing::info!(
            scope = ?self.scope,
            interval_secs = self.interval.as_secs(),
            "Reconciliation loop started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut feed_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(scope = ?self.scope, "Reconciliation loop stopping");
                    break;
                }
                received = feed.recv(), if feed_open => match received {
                    Ok(event) => {
                        if !self.scope.matches(&event) {
                            continue;
                        }
                        if let Err(e) = self.apply_event(&event).await {
                            tracing::error!(error = %e, request_id = %event.request_id, "Reconcile on event failed");
                        }
                        interval.reset();
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Reconciliation feed lagged, refreshing");
                        self.log_refresh().await;
                        interval.reset();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("Change feed closed, continuing with polling only");
                        feed_open = false;
                    }
                },
                _ = interval.tick() => {
                    self.log_refresh().await;
                }
            }
        }
    }

    async fn log_refresh(&self) {
        if let Err(e) = self.refresh().await {
            tracing::error!(error = %e, scope = ?self.scope, "Reconciliation poll failed");
        }
    }

    async fn fetch_scoped(&self) -> Result<Vec<Request>, CoreError> {
        match self.scope {
            FeedScope::Owner(owner) => self.store.list_by_owner(owner).await,
            FeedScope::Admin => self.store.list_all().await,
        }
    }
}
