//! Ordering of a customer's requests for the dashboard.
//!
//! This is not "newest first". The head of the list is the request that needs
//! the customer's attention:
//!
//! 1. completed but unpaid (the customer needs to pay),
//! 2. still in progress,
//! 3. completed and paid (settled history).
//!
//! Inside a rank newer `created_at` wins; `id` breaks the remaining ties so
//! the order is total.

use std::cmp::{Ordering, Reverse};

use serde::Serialize;

use crate::access::RequestView;
use crate::error::CoreError;
use crate::lifecycle::{progress, ONBOARDING_PROGRESS};
use crate::request::{PaymentStatus, Request, RequestStatus};
use crate::user::Actor;

/// Attention rank; lower sorts first.
fn rank(request: &Request) -> u8 {
    match (request.status, request.payment_status) {
        (RequestStatus::Completed, PaymentStatus::Unpaid) => 0,
        (RequestStatus::Completed, PaymentStatus::Paid) => 2,
        _ => 1,
    }
}

/// Total order used by [`sort_by_priority`].
pub fn compare_priority(a: &Request, b: &Request) -> Ordering {
    rank(a)
        .cmp(&rank(b))
        .then_with(|| Reverse(a.created_at).cmp(&Reverse(b.created_at)))
        .then_with(|| Reverse(a.id).cmp(&Reverse(b.id)))
}

/// Sort a customer's requests so the most actionable one comes first.
pub fn sort_by_priority(mut requests: Vec<Request>) -> Vec<Request> {
    requests.sort_by(compare_priority);
    requests
}

/// The request that drives the top-level dashboard affordances.
pub fn current_request(requests: &[Request]) -> Option<&Request> {
    requests.iter().min_by(|a, b| compare_priority(a, b))
}

// ---------------------------------------------------------------------------
// Dashboard summary
// ---------------------------------------------------------------------------

/// Top-of-dashboard summary for one customer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// The highest-priority request, if any.
    pub current: Option<RequestView>,
    /// Progress bar value; [`ONBOARDING_PROGRESS`] when there are no requests.
    pub progress: u8,
    pub total_requests: usize,
    pub awaiting_payment: usize,
    pub in_progress: usize,
}

impl DashboardSummary {
    /// Build the summary from the actor's own requests.
    pub fn build(actor: Actor, requests: &[Request]) -> Result<Self, CoreError> {
        let current = current_request(requests)
            .map(|r| RequestView::for_actor(actor, r))
            .transpose()?;

        let percent = current
            .as_ref()
            .map_or(ONBOARDING_PROGRESS, |view| progress(view.status));

        Ok(Self {
            current,
            progress: percent,
            total_requests: requests.len(),
            awaiting_payment: requests.iter().filter(|r| rank(r) == 0).count(),
            in_progress: requests.iter().filter(|r| rank(r) == 1).count(),
        })
    }
}
