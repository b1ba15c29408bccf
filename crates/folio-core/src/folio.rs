//! Wiring for a complete API access layer.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::api::ApiClient;
use crate::auth::{
    AuthManager, FileSessionStore, KeyringSessionStore, LoginFallback, SessionContext, SessionStore,
};
use crate::config::{Config, SessionBackend};
use crate::services::{ProjectsService, TestimonialsService};

/// One shared session, one client, and the services built on top of it.
#[derive(Clone)]
pub struct Folio {
    pub session: SessionContext,
    pub auth: AuthManager,
    pub projects: ProjectsService,
    pub testimonials: TestimonialsService,
}

impl Folio {
    /// Build everything from configuration. The stored session is resolved
    /// before this returns.
    pub fn from_config(config: &Config) -> Result<Self> {
        let session_dir = config.session_dir()?;
        let store: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::File => Arc::new(FileSessionStore::new(session_dir)),
            SessionBackend::Keyring => Arc::new(KeyringSessionStore::new(session_dir)),
        };
        let session = SessionContext::new(store, config.login_route());
        let client = ApiClient::new(config, session.clone())?;
        info!(
            environment = ?config.environment,
            backend = ?config.session_backend,
            "Folio client ready"
        );
        Ok(Self::with_client(client).with_fallback(LoginFallback::from_config(config)?))
    }

    /// Build on an existing client, e.g. one with a custom transport.
    pub fn with_client(client: ApiClient) -> Self {
        let session = client.session().clone();
        Self {
            auth: AuthManager::new(client.clone()),
            projects: ProjectsService::new(client.clone()),
            testimonials: TestimonialsService::new(client),
            session,
        }
    }

    fn with_fallback(mut self, fallback: LoginFallback) -> Self {
        self.auth = self.auth.with_fallback(fallback);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::auth::{AuthState, MemorySessionStore};
    use crate::services::ProjectQuery;
    use crate::testing::{user, ScriptedTransport};

    #[tokio::test]
    async fn test_services_share_one_session() {
        let store = Arc::new(MemorySessionStore::with_session("abc", user(1, "a@b.com")));
        let session = SessionContext::new(store, "/admin/login");
        let transport = Arc::new(ScriptedTransport::new());
        let folio = Folio::with_client(ApiClient::with_transport(transport.clone(), session));

        let redirects = Arc::new(AtomicUsize::new(0));
        let counter = redirects.clone();
        folio.session.on_invalidated(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(folio.auth.is_authenticated());
        transport.respond(401, json!({"message": "Token expired"}));
        let err = folio
            .projects
            .list(&ProjectQuery::default())
            .await
            .expect_err("unauthorized");

        assert_eq!(err.status, Some(401));
        assert_eq!(folio.auth.state(), AuthState::Anonymous);
        assert_eq!(folio.auth.token(), None);
        assert_eq!(redirects.load(Ordering::SeqCst), 1);
    }
}
