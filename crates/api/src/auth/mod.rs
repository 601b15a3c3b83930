//! Authentication primitives.
//!
//! - [`jwt`]: validation of identity-provider access tokens.
//! - [`signature`]: HMAC verification of payment-provider webhooks.

pub mod jwt;
pub mod signature;
