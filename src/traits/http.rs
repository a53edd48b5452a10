//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction for the one HTTP operation the chat
//! client needs (a streaming POST), enabling dependency injection and
//! mocking in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// A response body delivered incrementally, chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// An accepted (2xx) streaming response.
pub struct StreamingResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, if the transport produced one
    pub body: Option<ByteStream>,
}

impl StreamingResponse {
    /// Create a response with a body stream.
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Create an accepted response that carries no body.
    pub fn without_body(status: u16) -> Self {
        Self {
            status,
            body: None,
        }
    }
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status; `message` is the raw body
    ServerError { status: u16, message: String },
    /// IO error
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP client operations.
///
/// Implementations include the production reqwest-based client and
/// [`MockHttpClient`](crate::adapters::MockHttpClient) for tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a POST request and return a streaming response.
    ///
    /// A non-success status is reported as [`HttpError::ServerError`] carrying
    /// the raw (best-effort) error body. A success status yields a
    /// [`StreamingResponse`] whose body is received incrementally.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError>;
}
