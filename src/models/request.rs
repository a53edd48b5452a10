use serde::Serialize;

use super::ConversationMessage;

/// Body of a chat request: `{ "messages": [...] }`, oldest first.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ConversationMessage],
}

impl<'a> ChatRequest<'a> {
    pub fn new(messages: &'a [ConversationMessage]) -> Self {
        Self { messages }
    }

    /// Serialize to the JSON request body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
