//! Errors produced by a chat streaming session.
//!
//! Every failure that can end a session is one of these variants. They are
//! `Clone` so the terminal
//! [`ReplyEvent::Finished`](crate::session::ReplyEvent::Finished) notification,
//! holding a failed [`ReplyOutcome`](crate::session::ReplyOutcome), can carry
//! the error to any number of observers.

use thiserror::Error;

use super::ErrorCategory;
use crate::traits::HttpError;

/// Reason used when a rejected request carries no usable error body.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to get response";

/// Terminal failure of a chat request or stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    /// The endpoint answered with a non-success status.
    #[error("endpoint rejected request ({status}): {message}")]
    TransportRejected { status: u16, message: String },

    /// The endpoint accepted the request but no body stream was obtainable.
    #[error("no response stream available")]
    NoStreamAvailable,

    /// A chunk held bytes that are not valid UTF-8.
    #[error("stream is not valid UTF-8 (byte offset {offset})")]
    DecodeFault { offset: usize },

    /// A payload could not be parsed even after recombination at stream end.
    #[error("unparsable event payload: {message}")]
    PayloadParse { fragment: String, message: String },

    /// The transport failed before or during the stream.
    #[error("transport error: {0}")]
    Transport(HttpError),

    /// The outbound request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ChatError {
    /// Build a rejection from a raw error body.
    ///
    /// The body is expected to be `{"error": "..."}`. Anything else falls back
    /// to [`GENERIC_FAILURE_MESSAGE`].
    pub fn rejected(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        ChatError::TransportRejected { status, message }
    }

    /// Human-readable reason delivered with the terminal failure notification.
    ///
    /// For rejections this is exactly the server-supplied message.
    pub fn reason(&self) -> String {
        match self {
            ChatError::TransportRejected { message, .. } => message.clone(),
            ChatError::Transport(e) => e.to_string(),
            other => other.to_string(),
        }
    }

    /// Classify the error for retry and messaging decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::TransportRejected { status, .. } => match status {
                401 | 403 => ErrorCategory::Auth,
                429 | 500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            ChatError::NoStreamAvailable
            | ChatError::DecodeFault { .. }
            | ChatError::PayloadParse { .. } => ErrorCategory::Server,
            ChatError::Transport(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            ChatError::Transport(HttpError::ServerError { status, .. }) if *status < 500 => {
                ErrorCategory::Client
            }
            ChatError::Transport(HttpError::ServerError { .. }) => ErrorCategory::Server,
            ChatError::Transport(_) => ErrorCategory::Network,
            ChatError::InvalidRequest(_) => ErrorCategory::Client,
        }
    }

    /// Whether the caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::TransportRejected { .. } => "E_CHAT_REJECTED",
            ChatError::NoStreamAvailable => "E_CHAT_NO_STREAM",
            ChatError::DecodeFault { .. } => "E_CHAT_DECODE",
            ChatError::PayloadParse { .. } => "E_CHAT_PAYLOAD",
            ChatError::Transport(_) => "E_CHAT_TRANSPORT",
            ChatError::InvalidRequest(_) => "E_CHAT_REQUEST",
        }
    }
}

impl From<HttpError> for ChatError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => ChatError::rejected(status, &message),
            other => ChatError::Transport(other),
        }
    }
}
