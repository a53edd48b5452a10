//! Chaos Oracle - streaming chat client for the insights endpoint
//!
//! Sends a conversation to a chat endpoint and turns the server-sent event
//! stream it answers with into a growing reply.
//!
//! This library exposes modules for use by the binary and integration tests.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;

pub use client::ChatClient;
pub use config::{OracleConfig, TransportKind};
pub use error::{ChatError, ConfigError, ErrorCategory};
pub use session::{ReplyEvent, ReplyOutcome, ReplySubscription, StreamSession};
