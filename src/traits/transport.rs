//! Chat transport trait.
//!
//! A transport turns an ordered conversation into an open byte stream of
//! event frames. The HTTP transport talks to the remote endpoint; the canned
//! transport answers from a static table. Both feed the same decoder.

use async_trait::async_trait;

use crate::error::ChatError;
use crate::models::ConversationMessage;
use crate::traits::ByteStream;

/// Opens one response stream per request.
///
/// Implementations do not retry and do not validate message contents; they
/// forward the conversation as given.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Issue a single request for `messages` (oldest first).
    ///
    /// # Errors
    /// - [`ChatError::TransportRejected`] if the endpoint answered non-2xx
    /// - [`ChatError::NoStreamAvailable`] if it answered 2xx without a body
    /// - [`ChatError::Transport`] if the request could not be delivered
    async fn open(&self, messages: &[ConversationMessage]) -> Result<ByteStream, ChatError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
