//! Common test utilities for integration tests.
//!
//! Frame builders and a ready-wired client over the mock HTTP client.

#![allow(dead_code)]

use bytes::Bytes;
use chaos_oracle::adapters::mock::{MockHttpClient, MockResponse};
use chaos_oracle::adapters::HttpTransport;
use chaos_oracle::ChatClient;

pub const ENDPOINT: &str = "https://oracle.test/functions/v1/chat";

/// A `data:` line carrying one content fragment, newline-terminated.
pub fn content_frame(content: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({"choices": [{"delta": {"content": content}}]})
    )
}

pub fn done_frame() -> String {
    "data: [DONE]\n".to_string()
}

/// Split `text` into chunks of `size` bytes.
pub fn chunked(text: &str, size: usize) -> Vec<Bytes> {
    text.as_bytes()
        .chunks(size)
        .map(Bytes::copy_from_slice)
        .collect()
}

/// A client whose transport answers every request with `response`.
pub fn client_with(response: MockResponse) -> (MockHttpClient, ChatClient) {
    let http = MockHttpClient::new();
    http.set_response(ENDPOINT, response);
    let client = ChatClient::new(HttpTransport::new(http.clone(), ENDPOINT));
    (http, client)
}
