//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod request_repo;
pub mod testimonial_repo;
pub mod user_repo;

pub use event_repo::EventRepo;
pub use request_repo::RequestRepo;
pub use testimonial_repo::TestimonialRepo;
pub use user_repo::UserRepo;
