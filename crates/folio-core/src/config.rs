//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: which
//! backend to talk to, request timeout, where the session lives and the
//! optional direct-login fallback.
//!
//! Configuration is stored at `~/.config/folio/config.json`. Environment
//! variables (usually from a `.env` file) override the stored values.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "folio";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Development requests go through the local dev-server proxy so the
/// backend never sees a cross-origin request.
pub const DEVELOPMENT_API_BASE_URL: &str = "http://localhost:5173/api";

pub const PRODUCTION_API_BASE_URL: &str = "https://portfollio-backend-2-85n5.onrender.com/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Route the front end sends the user to when the session ends.
pub const DEFAULT_LOGIN_ROUTE: &str = "/admin/login";

// Environment variable names
pub const ENV_API_BASE_URL: &str = "FOLIO_API_BASE_URL";
pub const ENV_ENVIRONMENT: &str = "FOLIO_ENV";
pub const ENV_TIMEOUT_SECS: &str = "FOLIO_TIMEOUT_SECS";
pub const ENV_SESSION_BACKEND: &str = "FOLIO_SESSION_BACKEND";
pub const ENV_LOGIN_FALLBACK_URL: &str = "FOLIO_LOGIN_FALLBACK_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Some(Environment::Development),
            "prod" | "production" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn default_api_base_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_API_BASE_URL,
            Environment::Production => PRODUCTION_API_BASE_URL,
        }
    }
}

/// Where the session token is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Token and user as plain files in the session directory
    #[default]
    File,
    /// Token in the OS keychain, user in the session directory
    Keyring,
}

impl SessionBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Some(SessionBackend::File),
            "keyring" | "keychain" => Some(SessionBackend::Keyring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub session_backend: SessionBackend,
    pub login_route: Option<String>,
    pub login_fallback_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values and
    /// values that fail to parse leave the stored setting untouched.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(env) = lookup(ENV_ENVIRONMENT).and_then(|v| Environment::parse(&v)) {
            self.environment = env;
        }
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.trim().parse().ok()) {
            self.timeout_secs = Some(secs);
        }
        if let Some(backend) = lookup(ENV_SESSION_BACKEND).and_then(|v| SessionBackend::parse(&v)) {
            self.session_backend = backend;
        }
        if let Some(url) = lookup(ENV_LOGIN_FALLBACK_URL) {
            self.login_fallback_url = Some(url);
        }
        self
    }

    /// Backend base URL: explicit setting first, then the environment default.
    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| self.environment.default_api_base_url().to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn login_route(&self) -> &str {
        self.login_route.as_deref().unwrap_or(DEFAULT_LOGIN_ROUTE)
    }

    /// Directory holding the persisted session.
    pub fn session_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
