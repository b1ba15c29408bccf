//! Authentication module for managing the admin session.
//!
//! This module provides:
//! - `SessionStore`: token + user persistence (file, keychain, memory)
//! - `SessionContext`: shared, observable session state
//! - `AuthManager`: login/logout/profile operations
//!
//! Any 401 from the backend ends the session, exactly like a logout.

pub mod credentials;
pub mod manager;
pub mod session;
pub mod store;

pub use credentials::KeyringSessionStore;
pub use manager::{AuthManager, LoginFallback};
pub use session::{AuthState, Invalidation, InvalidationHook, InvalidationReason, SessionContext};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
