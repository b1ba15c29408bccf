//! REST API client module for the portfolio backend.
//!
//! This module provides the `ApiClient` used by the auth manager and the
//! resource services, the `Transport` seam it sends through, and the error
//! normalization that turns every failure into an `ErrorInfo`.
//!
//! The backend uses JWT bearer token authentication obtained through
//! `POST /auth/login`.

pub mod client;
pub mod error;
pub mod result;
pub mod transport;

pub use client::ApiClient;
pub use error::{ApiError, ErrorInfo, NetworkFailureKind, ServerError};
pub use result::{Envelope, ServiceResult};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
