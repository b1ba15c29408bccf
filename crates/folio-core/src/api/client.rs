//! API client for the portfolio backend.
//!
//! `ApiClient` attaches the session's bearer token to every request, turns
//! non-2xx responses into [`ApiError`]s and ends the session on any 401.
//! Resource services and the auth manager are its only callers.

use std::sync::Arc;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
use super::{ApiError, ErrorInfo, ServiceResult};
use crate::auth::{InvalidationReason, SessionContext};
use crate::config::Config;

/// Clone is cheap - the transport and session are shared.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &Config, session: SessionContext) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.api_base_url(), config.timeout())?;
        debug!(base_url = transport.base_url(), "API client configured");
        Ok(Self::with_transport(Arc::new(transport), session))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, session: SessionContext) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Send a request with the current token and check the response.
    async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        request.bearer = self.session.token();
        let target = request.target();

        let response = self.transport.send(request).await.map_err(|e| {
            debug!(target = %target, error = %e, "Request failed without response");
            e
        })?;

        match response.status {
            401 => {
                warn!(target = %target, "Unauthorized response, ending session");
                self.session.invalidate(InvalidationReason::Unauthorized);
            }
            403 => warn!(target = %target, "Forbidden: insufficient permissions"),
            429 => warn!(target = %target, "Rate limit exceeded"),
            _ => {}
        }

        check_response(response)
    }

    /// Typed request returning the raw error, for callers that need to
    /// inspect the failure before normalizing it.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = HttpRequest::new(method, path);
        request.query = query;
        request.body = body.map(encode_body).transpose()?;

        let response = self.execute(request).await?;
        decode_response(&response)
    }

    async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<&B>,
    ) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(method, path, query, body)
            .await
            .map_err(|e| ErrorInfo::normalize(&e))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> ServiceResult<T> {
        self.call::<T, ()>(Method::Get, path, query, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::Post, path, Vec::new(), Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::Put, path, Vec::new(), Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        self.call::<T, ()>(Method::Patch, path, Vec::new(), None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        self.call::<T, ()>(Method::Delete, path, Vec::new(), None).await
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request body: {}", e)))
}

/// Turn a non-2xx response into an error carrying the server's message.
pub(crate) fn check_response(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(response.status, &response.body))
    }
}

/// Decode a JSON body. An empty body (204) decodes as `null`.
pub(crate) fn decode_response<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
}
