//! Error types for the chat client.
//!
//! - [`ChatError`]: terminal failure of a streaming session
//! - [`ConfigError`]: configuration loading and validation
//! - [`ErrorCategory`]: coarse classification for retry and messaging
//!
//! Transport-level failures are [`HttpError`](crate::traits::HttpError),
//! defined next to the [`HttpClient`](crate::traits::HttpClient) trait.

mod category;
mod chat;
mod config;

pub use category::ErrorCategory;
pub use chat::{ChatError, GENERIC_FAILURE_MESSAGE};
pub use config::ConfigError;
