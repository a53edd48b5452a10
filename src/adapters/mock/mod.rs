//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted streaming responses
//! - [`RecordingSink`] - sink that records every notification

pub mod http;
pub mod sink;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use sink::RecordingSink;
