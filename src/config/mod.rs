//! Configuration management.
//!
//! n8n-mcp configuration can come from:
//! - Config file (~/.config/n8n-mcp/config.toml, or `--config <path>`)
//! - Environment variables (N8N_*), which take precedence
//!
//! ```toml
//! [n8n]
//! url = "https://n8n.example.com"
//! api_key = "..."
//! timeout_seconds = 30
//! verify_ssl = true
//!
//! [retry]
//! max_retries = 3
//! max_backoff_seconds = 8
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::retry::{DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES};
use crate::client::RetryPolicy;
use crate::error::{Error, Result};

/// n8n-mcp configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// n8n instance connection
    #[serde(default)]
    pub n8n: N8nConfig,

    /// Retry behaviour of the request layer
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Connection to one n8n instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct N8nConfig {
    /// Base URL of the instance, without `/api/v1`
    #[serde(default = "default_url")]
    pub url: String,

    /// API key sent as `X-N8N-API-KEY`. Required.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,

    /// Verify TLS certificates
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

impl Default for N8nConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
            verify_ssl: default_verify_ssl(),
        }
    }
}

impl fmt::Debug for N8nConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("N8nConfig")
            .field("url", &self.url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("timeout_seconds", &self.timeout_seconds)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

fn default_url() -> String {
    "http://localhost:5678".to_string()
}

fn default_timeout() -> f64 {
    30.0
}

fn default_verify_ssl() -> bool {
    true
}

impl N8nConfig {
    /// Instance URL without a trailing slash.
    pub fn base_url(&self) -> String {
        self.url.trim_end_matches('/').to_string()
    }

    /// Root of the public REST API.
    pub fn api_base(&self) -> String {
        format!("{}/api/v1", self.base_url())
    }

    pub fn timeout(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| Error::Config("timeout must be a positive number of seconds".into()))
    }

    fn is_local(&self) -> bool {
        let authority = self.url.split("://").nth(1).unwrap_or_default();
        ["localhost", "127.0.0.1", "[::1]"].iter().any(|host| {
            authority
                .strip_prefix(host)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with([':', '/']))
        })
    }
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 disables retrying
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Ceiling for any single backoff wait (seconds)
    #[serde(default = "default_max_backoff")]
    pub max_backoff_seconds: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_backoff_seconds: default_max_backoff(),
        }
    }
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_max_backoff() -> f64 {
    DEFAULT_MAX_DELAY.as_secs_f64()
}

impl Config {
    /// Load configuration from the default location plus the environment.
    ///
    /// A missing config file is fine; an unreadable one is logged and skipped.
    pub fn load() -> Self {
        let mut config = Self::default();

        let path = Self::config_dir().join("config.toml");
        if path.exists() {
            match Self::from_file(&path) {
                Ok(file) => config = file,
                Err(e) => warn!(path = %path.display(), "Ignoring config file: {}", e),
            }
        }

        config.apply_env_overrides();
        config
    }

    /// Load configuration from an explicit file plus the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML config file without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Get the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("n8n-mcp"))
            .unwrap_or_else(|| PathBuf::from(".n8n-mcp"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `N8N_*` overrides from `lookup`. Unparsable values are ignored
    /// with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("N8N_URL") {
            self.n8n.url = url;
        }
        if let Some(key) = lookup("N8N_API_KEY") {
            self.n8n.api_key = key;
        }
        if let Some(timeout) = lookup("N8N_TIMEOUT") {
            match timeout.trim().parse::<f64>() {
                Ok(parsed) if parsed.is_finite() && parsed > 0.0 => {
                    self.n8n.timeout_seconds = parsed
                }
                _ => warn!(
                    value = %timeout,
                    "Invalid N8N_TIMEOUT value, using {}s",
                    self.n8n.timeout_seconds
                ),
            }
        }
        if let Some(verify) = lookup("N8N_VERIFY_SSL") {
            self.n8n.verify_ssl = !verify.trim().eq_ignore_ascii_case("false");
        }
        if let Some(retries) = lookup("N8N_MAX_RETRIES") {
            match retries.trim().parse::<u32>() {
                Ok(parsed) => self.retry.max_retries = parsed,
                Err(_) => warn!(
                    value = %retries,
                    "Invalid N8N_MAX_RETRIES value, using {}",
                    self.retry.max_retries
                ),
            }
        }
        if let Some(backoff) = lookup("N8N_MAX_BACKOFF_SECONDS") {
            match backoff.trim().parse::<f64>() {
                Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => {
                    self.retry.max_backoff_seconds = parsed
                }
                _ => warn!(
                    value = %backoff,
                    "Invalid N8N_MAX_BACKOFF_SECONDS value, using {}s",
                    self.retry.max_backoff_seconds
                ),
            }
        }
    }

    /// Check that the configuration is usable before connecting.
    pub fn validate(&self) -> Result<()> {
        if self.n8n.api_key.trim().is_empty() {
            return Err(Error::Config("N8N_API_KEY is required".into()));
        }
        if !(self.n8n.url.starts_with("http://") || self.n8n.url.starts_with("https://")) {
            return Err(Error::Config(
                "N8N_URL must start with http:// or https://".into(),
            ));
        }
        self.n8n.timeout()?;
        self.max_delay()?;

        if self.n8n.url.starts_with("http://") && !self.n8n.is_local() {
            warn!("N8N_URL uses plain HTTP; the API key is sent unencrypted");
        }
        debug!(config = ?self, "Configuration validated");
        Ok(())
    }

    fn max_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.retry.max_backoff_seconds).map_err(|_| {
            Error::Config("max_backoff_seconds must be a non-negative number".into())
        })
    }

    /// Retry policy for the request executor.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.max_retries)
            .with_max_delay(self.max_delay().unwrap_or(DEFAULT_MAX_DELAY))
    }
}
