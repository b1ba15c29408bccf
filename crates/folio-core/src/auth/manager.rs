//! Login, logout and profile operations.
//!
//! `AuthManager` is the front end's entry point for everything that changes
//! who is signed in. All operations return a [`ServiceResult`]; none of them
//! fail any other way.
//!
//! Concurrent calls are not serialized. Two logins racing each other both
//! hit the backend and whichever response lands last decides the session.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

use super::session::{AuthState, InvalidationReason, SessionContext};
use crate::api::client::{check_response, decode_response};
use crate::api::{ApiClient, ApiError, ErrorInfo, HttpRequest, Method, ReqwestTransport, ServiceResult, Transport};
use crate::config::Config;
use crate::models::{
    AuthPayload, Credentials, PasswordChange, ProfilePayload, ProfileUpdate, Registration,
    RegistrationPayload, User,
};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const ME_PATH: &str = "/auth/me";
const PROFILE_PATH: &str = "/auth/profile";
const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

/// Second route for the login call only.
///
/// Some deployments reject the proxied login request at the cross-origin
/// layer while the backend itself is reachable. With `Direct`, a login that
/// fails without any response is retried once, straight against the backend,
/// with no token and no session side effects. Server responses (wrong
/// password, validation errors) are never retried.
#[derive(Clone, Default)]
pub enum LoginFallback {
    #[default]
    Disabled,
    Direct(Arc<dyn Transport>),
}

impl LoginFallback {
    pub fn direct(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(LoginFallback::Direct(Arc::new(ReqwestTransport::new(base_url, timeout)?)))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        match config.login_fallback_url.as_deref() {
            Some(url) => Self::direct(url, config.timeout()),
            None => Ok(LoginFallback::Disabled),
        }
    }
}

#[derive(Clone)]
pub struct AuthManager {
    client: ApiClient,
    fallback: LoginFallback,
}

impl AuthManager {
    /// Create the manager and resolve the stored session.
    pub fn new(client: ApiClient) -> Self {
        client.session().initialize();
        Self {
            client,
            fallback: LoginFallback::Disabled,
        }
    }

    pub fn with_fallback(mut self, fallback: LoginFallback) -> Self {
        self.fallback = fallback;
        self
    }

    fn session(&self) -> &SessionContext {
        self.client.session()
    }

    pub fn state(&self) -> AuthState {
        self.session().state()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session().subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().current_user()
    }

    pub fn token(&self) -> Option<String> {
        self.session().token()
    }

    /// Sign in and persist the returned session.
    pub async fn login(&self, credentials: &Credentials) -> ServiceResult<AuthPayload> {
        let primary = self
            .client
            .request::<AuthPayload, _>(Method::Post, LOGIN_PATH, Vec::new(), Some(credentials))
            .await;

        let payload = match (primary, &self.fallback) {
            (Ok(payload), _) => payload,
            (Err(e), LoginFallback::Direct(transport)) if e.is_network() => {
                warn!(error = %e, "Login request got no response, trying direct login");
                login_direct(transport.as_ref(), credentials)
                    .await
                    .map_err(|e| ErrorInfo::normalize(&e))?
            }
            (Err(e), _) => {
                info!(error = %e, "Login failed");
                return Err(ErrorInfo::normalize(&e));
            }
        };

        self.session()
            .establish(&payload.token, &payload.user)
            .map_err(|e| persist_error(&e))?;
        Ok(payload)
    }

    /// Create an admin account. Signs in when the backend returns a token.
    pub async fn register(&self, registration: &Registration) -> ServiceResult<RegistrationPayload> {
        let payload: RegistrationPayload = self.client.post(REGISTER_PATH, registration).await?;
        if let (Some(token), Some(user)) = (&payload.token, &payload.user) {
            self.session()
                .establish(token, user)
                .map_err(|e| persist_error(&e))?;
        }
        Ok(payload)
    }

    /// Fetch the profile from the backend and refresh the stored user.
    pub async fn fetch_profile(&self) -> ServiceResult<ProfilePayload> {
        let payload: ProfilePayload = self.client.get(ME_PATH, Vec::new()).await?;
        self.session()
            .refresh_user(&payload.user)
            .map_err(|e| persist_error(&e))?;
        Ok(payload)
    }

    /// Update the profile. Only the user half of the session changes.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ServiceResult<ProfilePayload> {
        let payload: ProfilePayload = self.client.put(PROFILE_PATH, update).await?;
        self.session()
            .refresh_user(&payload.user)
            .map_err(|e| persist_error(&e))?;
        Ok(payload)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ServiceResult<Value> {
        self.client.put(CHANGE_PASSWORD_PATH, change).await
    }

    /// End the session locally. Safe to call when already signed out.
    pub fn logout(&self) {
        self.session().invalidate(InvalidationReason::Logout);
    }
}

/// Login against the fallback transport: bare request, no token, no 401
/// handling.
async fn login_direct(transport: &dyn Transport, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
    let mut request = HttpRequest::new(Method::Post, LOGIN_PATH);
    request.body = Some(
        serde_json::to_value(credentials)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode credentials: {}", e)))?,
    );

    let response = check_response(transport.send(request).await?)?;
    decode_response(&response)
}

fn persist_error(error: &anyhow::Error) -> ErrorInfo {
    warn!(error = %error, "Failed to persist session");
    ErrorInfo::local(&format!("Failed to persist session: {:#}", error))
}
