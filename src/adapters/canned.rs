//! Offline chat transport answering from a fixed table.
//!
//! Answers are emitted as ordinary event frames so they travel through the
//! same decoder and accumulator as a live reply.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::ChatError;
use crate::models::{ConversationMessage, MessageRole, SUGGESTED_QUERIES};
use crate::sse::{DATA_PREFIX, DONE_SENTINEL};
use crate::traits::{ByteStream, ChatTransport};

const FALLBACK_ANSWER: &str = "The threads of chaos shift around your question. Upload a dataset and I shall trace the patterns hidden within it.";

/// Answers keyed by the suggested queries, in the same order.
const ANSWERS: [&str; 4] = [
    "I sense a recurring rhythm in your records: activity clusters at the start of each cycle and fades toward its end.",
    "Three values stand apart from the rest, lying far beyond the spread of their neighbours. Examine them before trusting any average.",
    "If the current momentum holds, the upward drift continues for the next few periods before levelling off.",
    "First, a small group of categories drives most of the volume. Second, missing values concentrate in a single column. Third, the strongest correlation links time and total.",
];

/// Replies without touching the network, after a fixed delay.
#[derive(Debug, Clone)]
pub struct CannedTransport {
    delay: Duration,
}

impl Default for CannedTransport {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

impl CannedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Answer for the most recent user message.
    pub fn answer_for(messages: &[ConversationMessage]) -> &'static str {
        let Some(last) = messages.iter().rev().find(|m| m.role() == MessageRole::User) else {
            return FALLBACK_ANSWER;
        };
        SUGGESTED_QUERIES
            .iter()
            .position(|s| s.query == last.content())
            .map(|i| ANSWERS[i])
            .unwrap_or(FALLBACK_ANSWER)
    }

    /// One data frame per word (trailing space kept), then the sentinel.
    fn frames(answer: &str) -> Result<Vec<Bytes>, ChatError> {
        let mut frames = Vec::new();
        for word in answer.split_inclusive(' ') {
            let payload = serde_json::json!({"choices": [{"delta": {"content": word}}]});
            let payload = serde_json::to_string(&payload)
                .map_err(|e| ChatError::InvalidRequest(e.to_string()))?;
            frames.push(Bytes::from(format!("{}{}\n\n", DATA_PREFIX, payload)));
        }
        frames.push(Bytes::from(format!("{}{}\n\n", DATA_PREFIX, DONE_SENTINEL)));
        Ok(frames)
    }
}

#[async_trait]
impl ChatTransport for CannedTransport {
    async fn open(&self, messages: &[ConversationMessage]) -> Result<ByteStream, ChatError> {
        let answer = Self::answer_for(messages);
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "serving canned reply");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let frames = Self::frames(answer)?;
        Ok(Box::pin(futures::stream::iter(frames.into_iter().map(Ok))))
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::RecordingSink;
    use crate::session::StreamSession;

    #[test]
    fn test_answer_for_suggested_query() {
        let messages = vec![
            ConversationMessage::user("hello"),
            ConversationMessage::assistant("hi"),
            ConversationMessage::user(SUGGESTED_QUERIES[3].query),
        ];
        assert_eq!(CannedTransport::answer_for(&messages), ANSWERS[3]);
    }

    #[test]
    fn test_answer_for_unknown_query() {
        let messages = vec![ConversationMessage::user("what is the meaning of this?")];
        assert_eq!(CannedTransport::answer_for(&messages), FALLBACK_ANSWER);
        assert_eq!(CannedTransport::answer_for(&[]), FALLBACK_ANSWER);
    }

    #[test]
    fn test_frames_end_with_sentinel() {
        let frames = CannedTransport::frames("two words").unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2], Bytes::from("data: [DONE]\n\n"));
        assert!(frames[0].starts_with(b"data: {"));
    }

    #[tokio::test]
    async fn test_reply_flows_through_session() {
        let transport = CannedTransport::new(Duration::ZERO);
        let messages = vec![ConversationMessage::user(SUGGESTED_QUERIES[0].query)];
        let body = transport.open(&messages).await.unwrap();

        let mut sink = RecordingSink::new();
        let outcome = StreamSession::new().run(body, &mut sink).await;
        assert!(outcome.is_completed());
        assert_eq!(outcome.text(), ANSWERS[0]);
        assert_eq!(sink.updates.len(), ANSWERS[0].split(' ').count());
        assert_eq!(transport.name(), "canned");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_delay() {
        let transport = CannedTransport::new(Duration::from_millis(1500));
        let start = tokio::time::Instant::now();
        transport.open(&[ConversationMessage::user("x")]).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }
}
