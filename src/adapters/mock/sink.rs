//! Recording sink for testing.

use crate::session::ReplyOutcome;
use crate::traits::StreamSink;

/// Keeps every notification it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Accumulated text reported by each update
    pub updates: Vec<String>,
    /// Terminal outcomes (a well-behaved session reports exactly one)
    pub outcomes: Vec<ReplyOutcome>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last reported text, if any update arrived.
    pub fn last_update(&self) -> Option<&str> {
        self.updates.last().map(String::as_str)
    }
}

impl StreamSink for RecordingSink {
    fn on_update(&mut self, text: &str) {
        self.updates.push(text.to_string());
    }

    fn on_finish(&mut self, outcome: &ReplyOutcome) {
        self.outcomes.push(outcome.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut sink = RecordingSink::new();
        sink.on_update("a");
        sink.on_update("ab");
        sink.on_finish(&ReplyOutcome::Completed {
            text: "ab".to_string(),
        });
        assert_eq!(sink.updates, vec!["a", "ab"]);
        assert_eq!(sink.last_update(), Some("ab"));
        assert_eq!(sink.outcomes.len(), 1);
    }
}
