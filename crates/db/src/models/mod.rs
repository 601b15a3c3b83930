//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row and,
//! where the row differs from the domain type, a conversion into
//! `serenade_core`.

pub mod event;
pub mod request;
pub mod testimonial;
pub mod user;
