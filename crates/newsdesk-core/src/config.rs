//! Client and application configuration.
//!
//! `ClientConfig` decides where requests go and how long they may take.
//! `Settings` is the small user file at `~/.config/newsdesk/config.json`
//! holding the last username and an optional base URL override.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "newsdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Absolute API base URL.
pub const BASE_URL_ENV: &str = "NEWSDESK_API_BASE_URL";

/// Origin of a development proxy. When set, request paths are sent as-is to
/// this origin with an empty base path and the proxy forwards them.
pub const DEV_PROXY_ENV: &str = "NEWSDESK_DEV_PROXY";

/// Per-request timeout in milliseconds.
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Resolve from the process environment, falling back to `fallback_base`
    /// (typically the persisted settings value) and then the default.
    pub fn from_env(fallback_base: Option<String>) -> Self {
        Self::resolve(
            std::env::var(DEV_PROXY_ENV).ok(),
            std::env::var(BASE_URL_ENV).ok().or(fallback_base),
        )
    }

    pub fn resolve(dev_proxy: Option<String>, base_url: Option<String>) -> Self {
        let non_empty = |v: Option<String>| {
            v.map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
        };

        let base_url = non_empty(dev_proxy)
            .or_else(|| non_empty(base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join a request path onto the base URL. Absolute URLs pass through.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub last_username: Option<String>,
    pub base_url: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
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

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
