//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - streaming HTTP POST
//! - [`ChatTransport`] - conversation in, event-frame byte stream out
//! - [`StreamSink`] - receiver of accumulated-text updates and the outcome

pub mod http;
pub mod sink;
pub mod transport;

pub use http::{ByteStream, Headers, HttpClient, HttpError, StreamingResponse};
pub use sink::StreamSink;
pub use transport::ChatTransport;
