//! Configuration loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while assembling an [`OracleConfig`](crate::config::OracleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An environment variable or flag held an unusable value.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    /// The assembled configuration cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
