//! Chat client: one transport, one session per request.
//!
//! # Example
//!
//! ```ignore
//! use chaos_oracle::{ChatClient, OracleConfig, ReplyEvent};
//! use chaos_oracle::models::ConversationMessage;
//!
//! let client = ChatClient::from_config(&OracleConfig::load(None)?)?;
//! let mut reply = client.subscribe(vec![ConversationMessage::user("Give me your top 3 insights")]);
//! while let Some(event) = reply.next().await {
//!     match event {
//!         ReplyEvent::Updated(text) => println!("{}", text),
//!         ReplyEvent::Finished(outcome) => println!("done: {}", outcome.is_completed()),
//!     }
//! }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::adapters::{CannedTransport, HttpTransport, ReqwestHttpClient};
use crate::config::{OracleConfig, TransportKind};
use crate::error::{ChatError, ConfigError};
use crate::models::ConversationMessage;
use crate::session::{ChannelSink, ReplyOutcome, ReplySubscription, StreamSession};
use crate::traits::{ChatTransport, StreamSink};

/// Sends conversations and streams replies back.
///
/// Cheap to clone; clones share the transport. Each request gets its own
/// [`StreamSession`], so concurrent requests never share decode state.
#[derive(Clone)]
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("transport", &self.transport.name())
            .finish()
    }
}

impl ChatClient {
    pub fn new(transport: impl ChatTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Build the transport selected by `config`.
    pub fn from_config(config: &OracleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = match config.transport {
            TransportKind::Canned => Self::new(CannedTransport::new(config.canned_delay())),
            TransportKind::Http => {
                let http = ReqwestHttpClient::with_connect_timeout(config.connect_timeout())
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                let mut transport = HttpTransport::new(http, config.endpoint_url());
                if let Some(token) = &config.access_token {
                    transport = transport.with_access_token(token.clone());
                }
                Self::new(transport)
            }
        };
        tracing::debug!(transport = client.transport_name(), "chat client ready");
        Ok(client)
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Send `messages` and drive the reply to completion on the current task.
    ///
    /// `sink` sees every update and then exactly one outcome, including when
    /// the request fails before a stream is opened.
    pub async fn run(
        &self,
        messages: &[ConversationMessage],
        sink: &mut dyn StreamSink,
    ) -> ReplyOutcome {
        let session = StreamSession::new();
        match self.transport.open(messages).await {
            Ok(body) => session.run(body, sink).await,
            Err(error) => session.fail(error, sink),
        }
    }

    /// Like [`run`](Self::run), but without a sink; only the outcome is kept.
    pub async fn send(&self, messages: &[ConversationMessage]) -> Result<String, ChatError> {
        let mut sink = DiscardSink;
        match self.run(messages, &mut sink).await {
            ReplyOutcome::Completed { text } => Ok(text),
            ReplyOutcome::Failed { error, .. } => Err(error),
        }
    }

    /// Start a session on a spawned task and return a handle to its events.
    ///
    /// Must be called within a tokio runtime.
    pub fn subscribe(&self, messages: Vec<ConversationMessage>) -> ReplySubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::clone(&self.transport);
        let session = StreamSession::new();
        let session_id = session.id();

        let task = tokio::spawn(async move {
            let mut sink = ChannelSink::new(tx);
            match transport.open(&messages).await {
                Ok(body) => {
                    session.run(body, &mut sink).await;
                }
                Err(error) => {
                    session.fail(error, &mut sink);
                }
            }
        });

        ReplySubscription::new(session_id, rx, task)
    }
}

struct DiscardSink;

impl StreamSink for DiscardSink {
    fn on_update(&mut self, _text: &str) {}

    fn on_finish(&mut self, _outcome: &ReplyOutcome) {}
}
