//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`HttpTransport`] - chat transport over a streaming POST
//! - [`CannedTransport`] - offline transport answering from a fixed table
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable streaming responses
//! - [`mock::RecordingSink`] - Captures session notifications

pub mod canned;
pub mod http_transport;
pub mod mock;
pub mod reqwest_http;

pub use canned::CannedTransport;
pub use http_transport::HttpTransport;
pub use mock::{MockHttpClient, MockResponse, RecordingSink};
pub use reqwest_http::ReqwestHttpClient;
