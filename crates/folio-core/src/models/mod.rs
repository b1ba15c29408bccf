//! Data models for portfolio backend records.
//!
//! This module contains the records and payloads exchanged with the API:
//!
//! - `User` and the auth payloads (`AuthPayload`, `ProfilePayload`, ...)
//! - `Project`, `ProjectInput` and list/detail payloads
//! - `Testimonial`, `TestimonialInput` and list/detail payloads
//! - `Pagination`, `RecordId` and other shared pieces
//!
//! Records keep unknown fields so that nothing the backend sends is lost on
//! a save/load cycle.

pub mod common;
pub mod project;
pub mod testimonial;
pub mod user;

pub use common::{MessagePayload, Pagination, RecordId};
pub use project::{Project, ProjectInput, ProjectList, ProjectPayload};
pub use testimonial::{Testimonial, TestimonialInput, TestimonialList, TestimonialPayload};
pub use user::{
    AuthPayload, Credentials, PasswordChange, ProfilePayload, ProfileUpdate, Registration,
    RegistrationPayload, User,
};
