//! Domain core for the personalized-song ordering workflow.
//!
//! Pure rules (lifecycle, access gating, priority ordering, media link
//! checks, read-model reconciliation) plus the collaborator contracts the
//! coordinator runs against. Nothing in this crate performs I/O.

pub mod access;
pub mod delivery;
pub mod error;
pub mod lifecycle;
pub mod media_link;
pub mod ports;
pub mod priority;
pub mod reconcile;
pub mod request;
pub mod types;
pub mod user;
