//! Configuration system (layered: defaults < config file < env).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{ConsoleError, Result};
use crate::presenter::RefreshStrategy;

pub const DEFAULT_ACCESS_PATH: &str = "api/tokens/access";
pub const DEFAULT_REFRESH_PATH: &str = "api/tokens/refresh";
pub const DEFAULT_CLIENTS_PATH: &str = "api/clients";
pub const DEFAULT_SCOPES_PATH: &str = "api/scopes";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "TOKEN_CONSOLE_BASE_URL";
const ENV_API_TOKEN: &str = "TOKEN_CONSOLE_API_TOKEN";
const ENV_TIMEOUT_SECS: &str = "TOKEN_CONSOLE_TIMEOUT_SECS";
const ENV_REFRESH_STRATEGY: &str = "TOKEN_CONSOLE_REFRESH_STRATEGY";

/// Connection settings for the authorization server's admin API.
///
/// Resolution order:
/// 1. Built-in defaults
/// 2. TOML config file (`~/.token-console/config.toml` unless overridden)
/// 3. Environment variables (`TOKEN_CONSOLE_*`, `.env` honored)
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub access_path: String,
    pub refresh_path: String,
    pub clients_path: String,
    pub scopes_path: String,
    /// Bearer token sent with every request.
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub refresh_strategy: RefreshStrategy,
}

impl fmt::Debug for ConsoleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleConfig")
            .field("base_url", &self.base_url)
            .field("access_path", &self.access_path)
            .field("refresh_path", &self.refresh_path)
            .field("clients_path", &self.clients_path)
            .field("scopes_path", &self.scopes_path)
            .field("api_token", &self.api_token.as_ref().map(|_| ".."))
            .field("timeout_secs", &self.timeout_secs)
            .field("refresh_strategy", &self.refresh_strategy)
            .finish()
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            access_path: DEFAULT_ACCESS_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            clients_path: DEFAULT_CLIENTS_PATH.to_string(),
            scopes_path: DEFAULT_SCOPES_PATH.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            refresh_strategy: RefreshStrategy::default(),
        }
    }
}

impl ConsoleConfig {
    /// Defaults pointed at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_refresh_strategy(mut self, strategy: RefreshStrategy) -> Self {
        self.refresh_strategy = strategy;
        self
    }

    /// Read a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Defaults overlaid with the process environment (and `.env`).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Full layered resolution.
    ///
    /// An explicit `path` must exist; the default path is used only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        base.apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                ConsoleError::Configuration(format!("{ENV_TIMEOUT_SECS} must be an integer, got {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_REFRESH_STRATEGY) {
            self.refresh_strategy = raw.trim().parse().map_err(|_| {
                ConsoleError::Configuration(format!(
                    "{ENV_REFRESH_STRATEGY} must be sequential or parallel, got {raw:?}"
                ))
            })?;
        }
        Ok(self)
    }

    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".token-console"))
            .unwrap_or_else(|| PathBuf::from(".token-console"))
            .join("config.toml")
    }

    /// The base URL as an absolute http(s) URL ending in `/`, so endpoint
    /// paths join beneath it.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| ConsoleError::Configuration(format!("invalid base URL {raw:?}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConsoleError::Configuration(format!(
                "base URL must be http or https, got {other}"
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
