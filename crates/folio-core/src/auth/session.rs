//! Shared session state.
//!
//! `SessionContext` is built once at startup and handed to the API client,
//! the auth manager and any front end that wants to watch the session. It is
//! the single writer of the session store.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::store::SessionStore;
use crate::models::User;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Session store not read yet
    Initializing,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The user asked to log out
    Logout,
    /// The backend answered 401 to some request
    Unauthorized,
}

/// Emitted whenever the session ends. Front ends react by sending the user
/// to `redirect_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub reason: InvalidationReason,
    pub redirect_to: String,
}

pub type InvalidationHook = Arc<dyn Fn(&Invalidation) + Send + Sync>;

#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn SessionStore>,
    state: watch::Sender<AuthState>,
    login_route: String,
    hook: RwLock<Option<InvalidationHook>>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>, login_route: impl Into<String>) -> Self {
        let (state, _) = watch::channel(AuthState::Initializing);
        Self {
            inner: Arc::new(Inner {
                store,
                state,
                login_route: login_route.into(),
                hook: RwLock::new(None),
            }),
        }
    }

    /// Register the callback run on every invalidation. Replaces any
    /// previous hook.
    pub fn on_invalidated<F>(&self, hook: F)
    where
        F: Fn(&Invalidation) + Send + Sync + 'static,
    {
        match self.inner.hook.write() {
            Ok(mut slot) => *slot = Some(Arc::new(hook)),
            Err(_) => warn!("Invalidation hook lock poisoned, hook not registered"),
        }
    }

    /// Resolve the initial state from the store. Reads local storage only.
    pub fn initialize(&self) -> AuthState {
        let state = match self.inner.store.read() {
            Ok(Some(session)) => AuthState::Authenticated(session.user),
            Ok(None) => AuthState::Anonymous,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session, starting anonymous");
                AuthState::Anonymous
            }
        };
        debug!(authenticated = state.is_authenticated(), "Session initialized");
        self.inner.state.send_replace(state.clone());
        state
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that sees every state transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn login_route(&self) -> &str {
        &self.inner.login_route
    }

    /// Bearer token for the next request, read from the store.
    pub fn token(&self) -> Option<String> {
        match self.inner.store.read() {
            Ok(session) => session.map(|s| s.token),
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    /// Persist a fresh session and mark it authenticated.
    pub fn establish(&self, token: &str, user: &User) -> Result<()> {
        self.inner.store.save(token, user)?;
        self.inner
            .state
            .send_replace(AuthState::Authenticated(user.clone()));
        info!(user = %user.email, "Session established");
        Ok(())
    }

    /// Replace the stored user, keeping the token. A no-op without a token.
    pub fn refresh_user(&self, user: &User) -> Result<()> {
        let Some(session) = self.inner.store.read()? else {
            debug!("No active session, user refresh skipped");
            return Ok(());
        };
        self.inner.store.save(&session.token, user)?;
        self.inner
            .state
            .send_replace(AuthState::Authenticated(user.clone()));
        Ok(())
    }

    /// End the session: clear the store, go anonymous, notify the hook.
    /// Logout and the 401 handler both land here.
    pub fn invalidate(&self, reason: InvalidationReason) {
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.inner.state.send_replace(AuthState::Anonymous);

        let event = Invalidation {
            reason,
            redirect_to: self.inner.login_route.clone(),
        };
        info!(?reason, redirect_to = %event.redirect_to, "Session invalidated");

        let hook = match self.inner.hook.read() {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        if let Some(hook) = hook {
            hook(&event);
        }
    }
}
