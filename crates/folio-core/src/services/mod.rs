//! Typed services for the portfolio resources.
//!
//! Each service wraps the shared [`ApiClient`](crate::api::ApiClient), so a
//! 401 from any endpoint ends the session the same way.

pub mod projects;
pub mod query;
pub mod testimonials;

pub use projects::ProjectsService;
pub use query::{PageQuery, ProjectQuery, QueryParams, SortOrder, TestimonialQuery, ToQuery};
pub use testimonials::TestimonialsService;
