//! Client configuration.
//!
//! Values are layered: defaults, then an optional JSON file, then
//! environment overrides, then whatever the caller sets with the `with_*`
//! builders (the binary maps its flags onto those).
//!
//! # Example
//!
//! ```ignore
//! use chaos_oracle::config::{OracleConfig, TransportKind};
//!
//! let config = OracleConfig::load(None)?
//!     .with_transport(TransportKind::Canned)
//!     .with_canned_delay_ms(0);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Path of the chat function below the base URL.
pub const CHAT_PATH: &str = "/functions/v1/chat";

pub const DEFAULT_BASE_URL: &str = "http://localhost:54321";

pub const ENV_URL: &str = "CHAOS_ORACLE_URL";
pub const ENV_TOKEN: &str = "CHAOS_ORACLE_TOKEN";
pub const ENV_TRANSPORT: &str = "CHAOS_ORACLE_TRANSPORT";
pub const ENV_CANNED_DELAY_MS: &str = "CHAOS_ORACLE_CANNED_DELAY_MS";

/// Which transport answers chat requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Streaming POST to the chat endpoint
    #[default]
    Http,
    /// Offline answers from a fixed table
    Canned,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(TransportKind::Http),
            "canned" | "mock" => Ok(TransportKind::Canned),
            _ => Err(ConfigError::InvalidValue {
                key: "transport".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Settings for the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Endpoint host, e.g. `https://project.supabase.co`
    pub base_url: String,
    /// Bearer token sent as `Authorization`
    pub access_token: Option<String>,
    pub transport: TransportKind,
    /// Delay before the canned transport answers
    pub canned_delay_ms: u64,
    /// Connect timeout of the HTTP transport (no read timeout is applied)
    pub connect_timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            transport: TransportKind::Http,
            canned_delay_ms: 1500,
            connect_timeout_secs: 10,
        }
    }
}

impl OracleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_canned_delay_ms(mut self, delay_ms: u64) -> Self {
        self.canned_delay_ms = delay_ms;
        self
    }

    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Full chat endpoint URL.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_PATH)
    }

    pub fn canned_delay(&self) -> Duration {
        Duration::from_millis(self.canned_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `~/.chaos-oracle/config.json`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".chaos-oracle").join("config.json"))
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            self.base_url = url;
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(transport) = get(ENV_TRANSPORT) {
            self.transport = transport.parse()?;
        }
        if let Some(delay) = get(ENV_CANNED_DELAY_MS) {
            self.canned_delay_ms = delay.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_CANNED_DELAY_MS.to_string(),
                value: delay.clone(),
            })?;
        }
        Ok(self)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Defaults, then the file at `path` (or the default path when it
    /// exists), then the environment.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading config file");
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };
        base.apply_env()
    }

    /// Check that the configuration can be used to build a client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport == TransportKind::Canned {
            return Ok(());
        }
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid(
                "base_url is required for the http transport".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "base_url".to_string(),
                value: self.base_url.clone(),
            });
        }
        Ok(())
    }
}
