//! Chat transport over a streaming HTTP POST.

use async_trait::async_trait;

use crate::error::ChatError;
use crate::models::{ChatRequest, ConversationMessage};
use crate::traits::{ByteStream, ChatTransport, Headers, HttpClient, HttpError};

/// Sends the conversation as JSON to a fixed endpoint and returns the
/// response body stream.
#[derive(Debug, Clone)]
pub struct HttpTransport<C> {
    client: C,
    endpoint: String,
    access_token: Option<String>,
}

impl<C: HttpClient> HttpTransport<C> {
    pub fn new(client: C, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            access_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        if let Some(token) = &self.access_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }
}

#[async_trait]
impl<C: HttpClient> ChatTransport for HttpTransport<C> {
    async fn open(&self, messages: &[ConversationMessage]) -> Result<ByteStream, ChatError> {
        let body = ChatRequest::new(messages)
            .to_json()
            .map_err(|e| ChatError::InvalidRequest(e.to_string()))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            messages = messages.len(),
            "dispatching chat request"
        );

        let response = self
            .client
            .post_stream(&self.endpoint, &body, &self.headers())
            .await
            .map_err(|e| {
                if let HttpError::ServerError { status, .. } = &e {
                    tracing::warn!(status, endpoint = %self.endpoint, "chat endpoint rejected request");
                }
                ChatError::from(e)
            })?;

        response.body.ok_or(ChatError::NoStreamAvailable)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
