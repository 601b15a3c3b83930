//! Merging a local read model with the store's view.
//!
//! Precedence follows `version`, never arrival order:
//!
//! - a local copy whose `version` is ahead of the remote one is kept, whether
//!   it is a confirmed write response or a pending optimistic edit;
//! - otherwise the remote copy replaces the local one;
//! - a record known only locally (an optimistic create) survives until the
//!   store returns it or the timeout elapses.
//!
//! Only pending state can expire. Expired optimistic state is dropped and
//! reported as [`CoreError::ReconciliationTimeout`] warnings. Reconciling the
//! same inputs twice gives the same result.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::request::Request;
use crate::types::{RequestId, Timestamp};

/// A request in a local read model.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecord {
    pub request: Request,
    /// When the unconfirmed local write was made; `None` once confirmed.
    pub pending_since: Option<Timestamp>,
}

impl LocalRecord {
    pub fn confirmed(request: Request) -> Self {
        Self {
            request,
            pending_since: None,
        }
    }

    pub fn optimistic(request: Request, now: Timestamp) -> Self {
        Self {
            request,
            pending_since: Some(now),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    fn expired(&self, now: Timestamp, timeout: chrono::Duration) -> bool {
        self.pending_since
            .is_some_and(|since| now.signed_duration_since(since) >= timeout)
    }

    fn timeout_warning(&self, now: Timestamp) -> CoreError {
        let waited = self
            .pending_since
            .map_or(0, |since| now.signed_duration_since(since).num_seconds());
        CoreError::ReconciliationTimeout {
            request_id: self.request.id,
            waited_secs: waited,
        }
    }
}

/// Result of one merge.
#[derive(Debug)]
pub struct Reconciled {
    pub records: Vec<LocalRecord>,
    pub warnings: Vec<CoreError>,
}

/// Merge `local` with `remote` by request id.
pub fn reconcile(
    local: Vec<LocalRecord>,
    remote: Vec<Request>,
    now: Timestamp,
    timeout: chrono::Duration,
) -> Reconciled {
    let mut by_id: HashMap<RequestId, LocalRecord> =
        local.into_iter().map(|r| (r.request.id, r)).collect();
    let mut records = Vec::with_capacity(remote.len() + by_id.len());
    let mut warnings = Vec::new();

    for theirs in remote {
        match by_id.remove(&theirs.id) {
            Some(ours) if ours.request.version > theirs.version => {
                if ours.expired(now, timeout) {
                    warnings.push(ours.timeout_warning(now));
                    records.push(LocalRecord::confirmed(theirs));
                } else {
                    records.push(ours);
                }
            }
            _ => records.push(LocalRecord::confirmed(theirs)),
        }
    }

    // Whatever is left is unknown to the store.
    let mut leftovers: Vec<LocalRecord> = by_id.into_values().collect();
    leftovers.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));
    for ours in leftovers {
        if !ours.is_pending() {
            continue;
        }
        if ours.expired(now, timeout) {
            warnings.push(ours.timeout_warning(now));
        } else {
            records.push(ours);
        }
    }

    Reconciled { records, warnings }
}

// ---------------------------------------------------------------------------
// ReadModel
// ---------------------------------------------------------------------------

/// A customer's or admin's in-memory working set.
#[derive(Debug, Default, Clone)]
pub struct ReadModel {
    records: Vec<LocalRecord>,
}

impl ReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a just-submitted record the store has not confirmed yet.
    ///
    /// Optimistic creates carry version 0 so any stored copy supersedes them.
    pub fn insert_optimistic(&mut self, mut request: Request, now: Timestamp) {
        request.version = 0;
        self.upsert(LocalRecord::optimistic(request, now));
    }

    /// Record a local edit ahead of the store (e.g. an admin action whose
    /// response has not arrived). The edit is kept until a remote copy at
    /// or beyond its version shows up.
    pub fn record_local_edit(&mut self, mut request: Request, now: Timestamp) {
        if let Some(existing) = self.get(request.id) {
            request.version = request.version.max(existing.version + 1);
        }
        self.upsert(LocalRecord::optimistic(request, now));
    }

    /// Replace a record with a confirmed copy (e.g. a write response).
    pub fn confirm(&mut self, request: Request) {
        match self.records.iter_mut().find(|r| r.request.id == request.id) {
            Some(existing) if existing.request.version > request.version => {}
            Some(existing) => *existing = LocalRecord::confirmed(request),
            None => self.records.push(LocalRecord::confirmed(request)),
        }
    }

    /// Merge a fresh remote listing into the model, returning warnings for
    /// dropped optimistic state.
    pub fn merge_remote(
        &mut self,
        remote: Vec<Request>,
        now: Timestamp,
        timeout: chrono::Duration,
    ) -> Vec<CoreError> {
        let local = std::mem::take(&mut self.records);
        let merged = reconcile(local, remote, now, timeout);
        self.records = merged.records;
        merged.warnings
    }

    pub fn get(&self, id: RequestId) -> Option<&Request> {
        self.records
            .iter()
            .find(|r| r.request.id == id)
            .map(|r| &r.request)
    }

    /// Snapshot of the current requests.
    pub fn requests(&self) -> Vec<Request> {
        self.records.iter().map(|r| r.request.clone()).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn upsert(&mut self, record: LocalRecord) {
        match self
            .records
            .iter_mut()
            .find(|r| r.request.id == record.request.id)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::request::fixtures::{at, request};
    use crate::request::{PaymentStatus, RequestStatus};

    fn timeout() -> chrono::Duration {
        chrono::Duration::seconds(120)
    }

    #[test]
    fn remote_wins_for_confirmed_records() {
        let mut stale = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        let mut fresh = stale.clone();
        fresh.status = RequestStatus::InProduction;
        fresh.version = 2;
        stale.version = 1;

        let out = reconcile(vec![LocalRecord::confirmed(stale)], vec![fresh.clone()], at(10), timeout());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].request, fresh);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn optimistic_create_survives_until_confirmed() {
        let mut model = ReadModel::new();
        let r = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        model.insert_optimistic(r.clone(), at(0));

        let warnings = model.merge_remote(vec![], at(30), timeout());
        assert!(warnings.is_empty());
        assert_eq!(model.len(), 1);
        assert_eq!(model.pending_count(), 1);

        let warnings = model.merge_remote(vec![r.clone()], at(60), timeout());
        assert!(warnings.is_empty());
        assert_eq!(model.pending_count(), 0);
        assert_eq!(model.get(r.id).unwrap().version, 1);
    }

    #[test]
    fn optimistic_create_expires_with_warning() {
        let mut model = ReadModel::new();
        let r = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        model.insert_optimistic(r.clone(), at(0));

        let warnings = model.merge_remote(vec![], at(121), timeout());
        assert!(model.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_matches!(
            &warnings[0],
            CoreError::ReconciliationTimeout { request_id, waited_secs: 121 } if *request_id == r.id
        );
    }

    #[test]
    fn stale_poll_does_not_clobber_pending_edit() {
        let mut model = ReadModel::new();
        let base = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        model.confirm(base.clone());

        let mut edited = base.clone();
        edited.payment_status = PaymentStatus::Paid;
        model.record_local_edit(edited, at(5));

        // A poll that started before the write lands later with version 1.
        model.merge_remote(vec![base.clone()], at(10), timeout());
        assert_eq!(
            model.get(base.id).unwrap().payment_status,
            PaymentStatus::Paid
        );

        // The store catches up.
        let mut stored = base.clone();
        stored.payment_status = PaymentStatus::Paid;
        stored.version = 2;
        model.merge_remote(vec![stored], at(20), timeout());
        assert_eq!(model.pending_count(), 0);
        assert_eq!(model.get(base.id).unwrap().version, 2);
    }

    #[test]
    fn unconfirmed_edit_reverts_after_timeout() {
        let mut model = ReadModel::new();
        let base = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        model.confirm(base.clone());
        let mut edited = base.clone();
        edited.status = RequestStatus::InProduction;
        model.record_local_edit(edited, at(0));

        let warnings = model.merge_remote(vec![base.clone()], at(500), timeout());
        assert_eq!(warnings.len(), 1);
        assert_eq!(model.get(base.id).unwrap().status, RequestStatus::Pending);
    }

    #[test]
    fn confirmed_record_missing_remotely_is_dropped_silently() {
        let mut model = ReadModel::new();
        model.confirm(request(RequestStatus::Pending, PaymentStatus::Unpaid, 0));
        let warnings = model.merge_remote(vec![], at(1), timeout());
        assert!(warnings.is_empty());
        assert!(model.is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let a = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        let b = request(RequestStatus::Completed, PaymentStatus::Paid, 5);
        let optimistic = request(RequestStatus::Pending, PaymentStatus::Unpaid, 9);

        let mut model = ReadModel::new();
        model.insert_optimistic(optimistic, at(9));
        model.merge_remote(vec![a.clone(), b.clone()], at(10), timeout());
        let first = model.requests();
        model.merge_remote(vec![a, b], at(10), timeout());
        assert_eq!(model.requests(), first);
    }

    #[test]
    fn stale_listing_does_not_revert_confirmed_write() {
        let mut model = ReadModel::new();
        let mut listed = request(RequestStatus::Pending, PaymentStatus::Unpaid, 0);
        listed.version = 2;
        model.confirm(listed.clone());

        // A write response folds in while a poll fetched before it is in flight.
        let mut paid = listed.clone();
        paid.payment_status = PaymentStatus::Paid;
        paid.version = 3;
        model.confirm(paid);

        let warnings = model.merge_remote(vec![listed.clone()], at(500), timeout());
        assert!(warnings.is_empty());
        assert_eq!(model.pending_count(), 0);
        let seen = model.get(listed.id).unwrap();
        assert_eq!(seen.version, 3);
        assert_eq!(seen.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn confirm_ignores_older_copies() {
        let mut model = ReadModel::new();
        let mut newer = request(RequestStatus::InProduction, PaymentStatus::Unpaid, 0);
        newer.version = 3;
        let mut older = newer.clone();
        older.version = 2;
        older.status = RequestStatus::Pending;
        model.confirm(newer.clone());
        model.confirm(older);
        assert_eq!(model.get(newer.id).unwrap().status, RequestStatus::InProduction);
    }
}
