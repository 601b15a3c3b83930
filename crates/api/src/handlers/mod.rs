pub mod admin;
pub mod payments;
pub mod requests;
pub mod testimonials;
