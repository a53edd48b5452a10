//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that returns scripted streaming
//! responses or errors, and records every request it receives.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, StreamingResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Accept the request and deliver these chunks, then end the stream
    Stream(Vec<Bytes>),
    /// Deliver these chunks, then fail the stream mid-way
    StreamThenError(Vec<Bytes>, HttpError),
    /// Deliver these chunks, then never produce anything else
    Hanging(Vec<Bytes>),
    /// Accept the request with no body
    NoBody,
    /// Fail the request before any stream is opened
    Error(HttpError),
}

/// Mock HTTP client for testing.
///
/// Clones share configuration, recorded requests and the open-stream count,
/// so a test can keep one handle while the code under test owns another.
///
/// # Example
///
/// ```ignore
/// use chaos_oracle::adapters::mock::{MockHttpClient, MockResponse};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "https://oracle.test/functions/v1/chat",
///     MockResponse::Stream(vec![Bytes::from("data: [DONE]\n")]),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Body streams handed out and not yet dropped
    open_streams: Arc<AtomicUsize>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL. Exact matches win over prefix matches.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Number of response bodies that are still alive.
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }

    fn tracked(&self, inner: ByteStream) -> ByteStream {
        self.open_streams.fetch_add(1, Ordering::SeqCst);
        Box::pin(TrackedStream {
            inner,
            open: Arc::clone(&self.open_streams),
        })
    }
}

/// Decrements the shared open-stream count when dropped.
struct TrackedStream {
    inner: ByteStream,
    open: Arc<AtomicUsize>,
}

impl Stream for TrackedStream {
    type Item = Result<Bytes, HttpError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));

        let body: ByteStream = match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => {
                Box::pin(futures::stream::iter(chunks.into_iter().map(Ok)))
            }
            Some(MockResponse::StreamThenError(chunks, err)) => Box::pin(futures::stream::iter(
                chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(err))),
            )),
            Some(MockResponse::Hanging(chunks)) => {
                use futures::StreamExt;
                Box::pin(
                    futures::stream::iter(chunks.into_iter().map(Ok))
                        .chain(futures::stream::pending()),
                )
            }
            Some(MockResponse::NoBody) => return Ok(StreamingResponse::without_body(200)),
            Some(MockResponse::Error(err)) => return Err(err),
            None => return Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        };

        Ok(StreamingResponse::new(200, self.tracked(body)))
    }
}
