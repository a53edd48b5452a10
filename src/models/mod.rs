//! Conversation data types.

pub mod conversation;
pub mod message;
pub mod request;

pub use conversation::{
    Conversation, SuggestedQuery, TranscriptEntry, APOLOGY, GREETING, SUGGESTED_QUERIES,
};
pub use message::{ConversationMessage, MessageRole};
pub use request::ChatRequest;
