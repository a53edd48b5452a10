//! Error category classification.
//!
//! Categories give the caller a coarse handle for retry decisions and
//! messaging without matching on every error variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout or mid-stream I/O failures.
    /// Generally transient and retryable.
    Network,

    /// The endpoint refused the access token (401/403).
    Auth,

    /// The endpoint failed or misbehaved (5xx, 429, unreadable stream).
    /// Generally transient and retryable after a delay.
    Server,

    /// The request itself was wrong (other 4xx, unencodable body).
    /// Not retryable without changing the request.
    Client,

    /// Missing or invalid settings.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your internet connection and try again",
            ErrorCategory::Auth => "Check the configured access token",
            ErrorCategory::Server => "The oracle may be overloaded. Please try again later",
            ErrorCategory::Client => "Rephrase the request and try again",
            ErrorCategory::Configuration => "Check the endpoint URL and transport settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
