use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message shown when no response was received at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Fallback when the server responded with an error but no message.
pub const SERVER_ERROR_FALLBACK: &str = "An error occurred";

/// Fallback for local failures without a message of their own.
pub const UNEXPECTED_ERROR_FALLBACK: &str = "An unexpected error occurred";

/// Maximum length for error response bodies kept in errors
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Why no response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailureKind {
    Timeout,
    Connect,
    Other,
}

impl fmt::Display for NetworkFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkFailureKind::Timeout => "request timed out",
            NetworkFailureKind::Connect => "could not connect to server",
            NetworkFailureKind::Other => "no response received",
        };
        f.write_str(s)
    }
}

/// A non-2xx response, with whatever the server said about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub status: u16,
    pub message: Option<String>,
    pub details: Vec<String>,
    pub body: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} ({})", message, self.status),
            None => write!(f, "status {}: {}", self.status, self.body),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired: {0}")]
    Unauthorized(ServerError),

    #[error("Access denied: {0}")]
    AccessDenied(ServerError),

    #[error("Resource not found: {0}")]
    NotFound(ServerError),

    #[error("Rate limited - please wait before retrying: {0}")]
    RateLimited(ServerError),

    #[error("Server error: {0}")]
    ServerError(ServerError),

    #[error("Request rejected: {0}")]
    Rejected(ServerError),

    #[error("Network error: {kind} ({target}): {reason}")]
    Network {
        kind: NetworkFailureKind,
        target: String,
        reason: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Local(String),
}

/// Error body shape used by the backend: `{error, message, details}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        let message = match parsed.error {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
        .or(parsed.message.filter(|m| !m.is_empty()));

        let details = match parsed.details {
            Some(Value::Array(items)) => items.iter().map(detail_text).collect(),
            Some(Value::String(s)) => vec![s],
            _ => Vec::new(),
        };

        let server = ServerError {
            status,
            message,
            details,
            body: Self::truncate_body(body),
        };

        match status {
            401 => ApiError::Unauthorized(server),
            403 => ApiError::AccessDenied(server),
            404 => ApiError::NotFound(server),
            429 => ApiError::RateLimited(server),
            500..=599 => ApiError::ServerError(server),
            _ => ApiError::Rejected(server),
        }
    }

    pub fn server(&self) -> Option<&ServerError> {
        match self {
            ApiError::Unauthorized(s)
            | ApiError::AccessDenied(s)
            | ApiError::NotFound(s)
            | ApiError::RateLimited(s)
            | ApiError::ServerError(s)
            | ApiError::Rejected(s) => Some(s),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.server().map(|s| s.status)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Validation errors arrive either as plain strings or as objects like
/// `{"msg": "...", "param": "title"}`.
fn detail_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("msg")
            .or_else(|| obj.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| item.to_string()),
        other => other.to_string(),
    }
}

/// Uniform failure shape handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
    pub status: Option<u16>,
    #[serde(default)]
    pub is_network_error: bool,
}

impl ErrorInfo {
    /// Normalize any failure into the uniform shape. Pure: no retries, no
    /// side effects.
    pub fn normalize(error: &ApiError) -> Self {
        if let Some(server) = error.server() {
            return Self {
                message: server
                    .message
                    .clone()
                    .unwrap_or_else(|| SERVER_ERROR_FALLBACK.to_string()),
                details: server.details.clone(),
                status: Some(server.status),
                is_network_error: false,
            };
        }

        match error {
            ApiError::Network {
                kind,
                target,
                reason,
            } => Self {
                message: NETWORK_ERROR_MESSAGE.to_string(),
                details: vec![kind.to_string(), format!("{}: {}", target, reason)],
                status: None,
                is_network_error: true,
            },
            ApiError::InvalidRequest(msg) | ApiError::InvalidResponse(msg) | ApiError::Local(msg) => {
                Self::local(msg)
            }
            // Server-backed variants handled above
            _ => Self::local(&error.to_string()),
        }
    }

    /// A failure that never produced a response.
    pub fn local(message: &str) -> Self {
        let message = message.trim();
        Self {
            message: if message.is_empty() {
                UNEXPECTED_ERROR_FALLBACK.to_string()
            } else {
                message.to_string()
            },
            details: Vec::new(),
            status: None,
            is_network_error: false,
        }
    }
}

impl From<ApiError> for ErrorInfo {
    fn from(error: ApiError) -> Self {
        Self::normalize(&error)
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(status) = self.status {
            write!(f, " ({})", status)?;
        }
        for detail in &self.details {
            write!(f, "\n  - {}", detail)?;
        }
        Ok(())
    }
}
