//! Folio core - API access layer for the portfolio backend.
//!
//! This crate provides everything a front end needs to talk to the
//! portfolio REST API:
//!
//! - `api`: HTTP client, transport seam, error normalization
//! - `auth`: session store backends, session context, auth manager
//! - `services`: typed projects and testimonials services
//! - `models`: backend records and payloads
//! - `config`: configuration file and environment overrides
//!
//! Every public service operation returns a [`ServiceResult`]; failures are
//! normalized into [`ErrorInfo`] and never escape as panics.

pub mod api;
pub mod auth;
pub mod config;
pub mod folio;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, Envelope, ErrorInfo, ServiceResult};
pub use auth::{AuthManager, AuthState, Invalidation, InvalidationReason, SessionContext};
pub use config::Config;
pub use folio::Folio;
