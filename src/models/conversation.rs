//! Visible chat transcript and the history sent to the endpoint.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ConversationMessage, MessageRole};

/// Opening line shown before the first exchange. Never sent upstream.
pub const GREETING: &str = "I am the manifestation of chaos wisdom, channeling the power of the Darkhold. Ask me anything about your data, and I shall reveal the hidden truths within the patterns of reality.";

/// Shown in place of a reply when a session fails.
pub const APOLOGY: &str = "The chaos magic falters... Please try again.";

/// A one-click query offered before the user types anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedQuery {
    pub label: &'static str,
    pub query: &'static str,
}

pub const SUGGESTED_QUERIES: [SuggestedQuery; 4] = [
    SuggestedQuery {
        label: "Identify patterns",
        query: "What patterns do you see in my data?",
    },
    SuggestedQuery {
        label: "Anomalies",
        query: "Are there any anomalies or outliers?",
    },
    SuggestedQuery {
        label: "Predictions",
        query: "What trends can you predict from this data?",
    },
    SuggestedQuery {
        label: "Insights",
        query: "Give me your top 3 insights",
    },
];

/// A transcript entry: the message plus display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub message: ConversationMessage,
    pub timestamp: DateTime<Utc>,
    /// Greeting entries are displayed but excluded from the outbound history.
    pub greeting: bool,
}

impl TranscriptEntry {
    fn new(message: ConversationMessage, greeting: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            message,
            timestamp: Utc::now(),
            greeting,
        }
    }
}

/// Ordered, append-only conversation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<TranscriptEntry>,
    outbound: Vec<ConversationMessage>,
}

impl Conversation {
    /// An empty conversation with no greeting.
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation that opens with the assistant's [`GREETING`].
    pub fn with_greeting() -> Self {
        let mut conversation = Self::new();
        conversation.entries.push(TranscriptEntry::new(
            ConversationMessage::assistant(GREETING),
            true,
        ));
        conversation
    }

    /// Record a user submission and return the history to send, oldest first.
    pub fn push_user(&mut self, content: impl Into<String>) -> &[ConversationMessage] {
        self.push(ConversationMessage::user(content));
        &self.outbound
    }

    /// Record a finished assistant reply. Empty replies are not recorded.
    ///
    /// Returns whether the reply was recorded.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if content.is_empty() {
            return false;
        }
        self.push(ConversationMessage::assistant(content));
        true
    }

    fn push(&mut self, message: ConversationMessage) {
        self.outbound.push(message.clone());
        self.entries.push(TranscriptEntry::new(message, false));
    }

    /// Messages exchanged with the endpoint, oldest first.
    pub fn outbound(&self) -> &[ConversationMessage] {
        &self.outbound
    }

    /// Everything displayed, greeting included.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&ConversationMessage> {
        self.entries.last().map(|e| &e.message)
    }

    /// Whether the next reply is awaited (the last message is the user's).
    pub fn awaiting_reply(&self) -> bool {
        self.outbound
            .last()
            .is_some_and(|m| m.role() == MessageRole::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_is_displayed_not_sent() {
        let mut conversation = Conversation::with_greeting();
        assert_eq!(conversation.transcript().len(), 1);
        assert!(conversation.transcript()[0].greeting);
        assert!(conversation.outbound().is_empty());

        let outbound = conversation.push_user("What patterns do you see in my data?");
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].role(), MessageRole::User);
        assert_eq!(conversation.transcript().len(), 2);
    }

    #[test]
    fn test_history_accumulates_in_order() {
        let mut conversation = Conversation::new();
        conversation.push_user("first");
        assert!(conversation.awaiting_reply());
        assert!(conversation.push_assistant("reply one"));
        assert!(!conversation.awaiting_reply());
        let outbound = conversation.push_user("second");

        let contents: Vec<_> = outbound.iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["first", "reply one", "second"]);
    }

    #[test]
    fn test_empty_reply_not_recorded() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello");
        assert!(!conversation.push_assistant(""));
        assert_eq!(conversation.outbound().len(), 1);
        assert!(conversation.awaiting_reply());
    }

    #[test]
    fn test_last_message() {
        let mut conversation = Conversation::with_greeting();
        assert_eq!(conversation.last().map(|m| m.content()), Some(GREETING));
        conversation.push_user("hi");
        assert_eq!(conversation.last().map(|m| m.content()), Some("hi"));
    }

    #[test]
    fn test_suggested_queries_are_distinct() {
        for (i, a) in SUGGESTED_QUERIES.iter().enumerate() {
            for b in &SUGGESTED_QUERIES[i + 1..] {
                assert_ne!(a.query, b.query);
            }
        }
    }
}
