//! Reconciliation loop behaviour against the in-memory store.

mod common;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{details, harness, ADMIN, OWNER_ID};
use serenade_core::ports::RequestStore;
use serenade_core::request::{CreateRequest, PaymentStatus, Request, RequestStatus};
use serenade_events::FeedScope;
use serenade_fulfillment::ReconciliationLoop;
use tokio_util::sync::CancellationToken;

fn optimistic_request(owner: i64) -> Request {
    Request::from_submission(
        &CreateRequest {
            id: serenade_core::types::new_request_id(),
            owner_id: owner,
            details: details(),
        },
        Utc::now(),
    )
}

#[tokio::test]
async fn refresh_pulls_owner_scoped_listing() {
    let h = harness().await;
    h.coordinator.submit_request(OWNER_ID, None, details()).await.unwrap();
    h.coordinator.submit_request(99, None, details()).await.unwrap();

    let sync = ReconciliationLoop::new(h.store.clone(), FeedScope::Owner(OWNER_ID));
    sync.refresh().await.unwrap();

    let model = sync.model();
    let model = model.read().await;
    assert_eq!(model.len(), 1);
    assert!(model.requests().iter().all(|r| r.owner_id == OWNER_ID));
}

#[tokio::test]
async fn optimistic_create_survives_until_confirmed() {
    let h = harness().await;
    let sync = ReconciliationLoop::new(h.store.clone(), FeedScope::Owner(OWNER_ID));
    let local = optimistic_request(OWNER_ID);
    sync.model().write().await.insert_optimistic(local.clone(), Utc::now());

    // Store has not seen it yet: the record stays, no warning.
    let warnings = sync.refresh().await.unwrap();
    assert!(warnings.is_empty());
    assert_eq!(sync.model().read().await.pending_count(), 1);

    // Create lands with the same client-minted id.
    h.store
        .create(&CreateRequest {
            id: local.id,
            owner_id: OWNER_ID,
            details: details(),
        })
        .await
        .unwrap();
    sync.refresh().await.unwrap();

    let model = sync.model();
    let model = model.read().await;
    assert_eq!(model.len(), 1);
    assert_eq!(model.pending_count(), 0);
    assert_eq!(model.get(local.id).map(|r| r.version), Some(1));
}

#[tokio::test]
async fn unconfirmed_record_is_dropped_after_timeout() {
    let h = harness().await;
    let sync = ReconciliationLoop::new(h.store.clone(), FeedScope::Owner(OWNER_ID))
        .with_timeout(chrono::Duration::seconds(120));
    let local = optimistic_request(OWNER_ID);
    sync.model()
        .write()
        .await
        .insert_optimistic(local.clone(), Utc::now() - chrono::Duration::seconds(300));

    let warnings = sync.refresh().await.unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(sync.model().read().await.is_empty());
}

#[tokio::test]
async fn feed_event_refreshes_without_waiting_for_poll() {
    let h = harness().await;
    let created = h.coordinator.submit_request(OWNER_ID, None, details()).await.unwrap();

    let sync = Arc::new(
        ReconciliationLoop::new(h.store.clone(), FeedScope::Admin)
            .with_interval(Duration::from_secs(3600)),
    );
    let model = sync.model();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(sync.run(h.bus.subscribe(), cancel.clone()));

    // Let the immediate first tick populate the model.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        model.read().await.get(created.id).map(|r| r.status),
        Some(RequestStatus::Pending)
    );

    h.coordinator
        .set_status(ADMIN, created.id, RequestStatus::InProduction, false)
        .await
        .unwrap();

    let mut observed = None;
    for _ in 0..50 {
        observed = model.read().await.get(created.id).map(|r| r.status);
        if observed == Some(RequestStatus::InProduction) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(observed, Some(RequestStatus::InProduction));

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn stale_poll_does_not_overwrite_newer_local_edit() {
    let h = harness().await;
    let created = h.coordinator.submit_request(OWNER_ID, None, details()).await.unwrap();
    let sync = ReconciliationLoop::new(h.store.clone(), FeedScope::Admin);
    sync.refresh().await.unwrap();

    let mut edited = created.clone();
    edited.status = RequestStatus::InProduction;
    sync.model().write().await.record_local_edit(edited, Utc::now());

    sync.refresh().await.unwrap();
    let status = sync.model().read().await.get(created.id).map(|r| r.status);
    assert_eq!(status, Some(RequestStatus::InProduction));
}

#[tokio::test]
async fn loop_stops_on_cancel() {
    let h = harness().await;
    let store: Arc<dyn RequestStore> = h.store.clone();
    let sync = Arc::new(ReconciliationLoop::new(store, FeedScope::Admin));
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(sync.run(h.bus.subscribe(), cancel.clone()));
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop should stop promptly")
        .unwrap();
}

#[tokio::test]
async fn fold_waits_for_a_primed_model() {
    let h = harness().await;
    let first = h.coordinator.submit_request(OWNER_ID, None, details()).await.unwrap();
    let second = h.coordinator.submit_request(OWNER_ID, None, details()).await.unwrap();
    let sync = ReconciliationLoop::new(h.store.clone(), FeedScope::Admin);

    let updated = h
        .coordinator
        .attach_final_media(ADMIN, first.id, "https://cdn.example.com/a.mp3", false)
        .await
        .unwrap();
    sync.fold(updated.clone()).await;
    assert!(sync.model().read().await.is_empty());

    sync.refresh().await.unwrap();
    let paid = h
        .coordinator
        .set_payment(ADMIN, second.id, PaymentStatus::Paid, false)
        .await
        .unwrap();
    sync.fold(paid.clone()).await;

    let model = sync.model();
    let model = model.read().await;
    assert_eq!(model.len(), 2);
    assert_eq!(model.get(first.id), Some(&updated));
    assert_eq!(model.get(second.id), Some(&paid));
}

#[tokio::test]
async fn listing_fetched_before_a_folded_write_does_not_revert_it() {
    let h = harness().await;
    let created = h.coordinator.submit_request(OWNER_ID, None, details()).await.unwrap();
    let sync = ReconciliationLoop::new(h.store.clone(), FeedScope::Admin);
    sync.refresh().await.unwrap();

    // A poll reads the listing, then the admin write lands and is folded
    // before the poll merges.
    let in_flight = h.store.list_all().await.unwrap();
    let paid = h
        .coordinator
        .set_payment(ADMIN, created.id, PaymentStatus::Paid, false)
        .await
        .unwrap();
    sync.fold(paid.clone()).await;

    let model = sync.model();
    let warnings = model
        .write()
        .await
        .merge_remote(in_flight, Utc::now(), chrono::Duration::seconds(120));
    assert!(warnings.is_empty());
    assert_eq!(model.read().await.get(created.id), Some(&paid));

    // The next poll sees the same version and changes nothing.
    sync.refresh().await.unwrap();
    assert_eq!(model.read().await.get(created.id), Some(&paid));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn board_never_falls_behind_a_folded_write() {
    let h = harness().await;
    let created = h.coordinator.submit_request(OWNER_ID, None, details()).await.unwrap();
    let id = created.id;
    let sync = Arc::new(ReconciliationLoop::new(h.store.clone(), FeedScope::Admin));
    sync.refresh().await.unwrap();
    let coordinator = Arc::new(h.coordinator);
    let folded = Arc::new(AtomicI64::new(created.version));

    let writer = tokio::spawn({
        let sync = sync.clone();
        let folded = folded.clone();
        async move {
            for i in 0..40 {
                let status = if i % 2 == 0 {
                    RequestStatus::InProduction
                } else {
                    RequestStatus::Pending
                };
                let updated = coordinator.set_status(ADMIN, id, status, true).await.unwrap();
                sync.fold(updated.clone()).await;
                folded.fetch_max(updated.version, Ordering::SeqCst);
            }
        }
    });

    let poller = tokio::spawn({
        let sync = sync.clone();
        let folded = folded.clone();
        async move {
            for _ in 0..200 {
                sync.refresh().await.unwrap();
                let floor = folded.load(Ordering::SeqCst);
                let seen = sync.model().read().await.get(id).map(|r| r.version);
                assert!(
                    seen.is_some_and(|v| v >= floor),
                    "board at {seen:?} after version {floor} was folded"
                );
                tokio::task::yield_now().await;
            }
        }
    });

    let (writer, poller) = tokio::join!(writer, poller);
    writer.unwrap();
    poller.unwrap();

    let stored = h.store.get(id).await.unwrap().unwrap();
    assert_eq!(sync.model().read().await.get(id), Some(&stored));
}
