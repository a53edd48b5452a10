//! Per-request streaming session.
//!
//! A [`StreamSession`] owns the decode buffer and the reply accumulator for
//! exactly one response stream. It pulls chunks in arrival order, runs the
//! synchronous decode/parse/accumulate step for each, and reports to a
//! [`StreamSink`]. Concurrent requests use independent sessions.

mod subscription;

pub use subscription::{ChannelSink, ReplySubscription};

use futures::StreamExt;
use uuid::Uuid;

use crate::error::ChatError;
use crate::sse::{FrameDecoder, LineAction, ReplyAccumulator};
use crate::traits::{ByteStream, StreamSink};

/// How a session ended. Text accumulated before a failure is kept.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    Completed { text: String },
    Failed { error: ChatError, text: String },
}

impl ReplyOutcome {
    /// The final accumulated reply.
    pub fn text(&self) -> &str {
        match self {
            ReplyOutcome::Completed { text } | ReplyOutcome::Failed { text, .. } => text,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ReplyOutcome::Completed { .. })
    }

    pub fn error(&self) -> Option<&ChatError> {
        match self {
            ReplyOutcome::Completed { .. } => None,
            ReplyOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Notification delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEvent {
    /// Full accumulated text after a successful append.
    Updated(String),
    /// Terminal notification; nothing follows it.
    Finished(ReplyOutcome),
}

/// Whether the stream should keep being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Open,
    Done,
}

/// Counters describing one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub chunks: usize,
    pub bytes: usize,
    pub lines: usize,
    pub fragments: usize,
    pub requeued: usize,
    pub abandoned: usize,
}

/// Decode and accumulation state of one response stream.
#[derive(Debug)]
pub struct StreamSession {
    id: Uuid,
    decoder: FrameDecoder,
    accumulator: ReplyAccumulator,
    stats: SessionStats,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            decoder: FrameDecoder::new(),
            accumulator: ReplyAccumulator::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The reply accumulated so far.
    pub fn text(&self) -> &str {
        self.accumulator.text()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            fragments: self.accumulator.fragments(),
            abandoned: self.accumulator.abandoned(),
            ..self.stats
        }
    }

    /// Process one chunk: decode it and apply every complete line it finishes.
    ///
    /// All lines are handled before returning, so a chunk holding several
    /// frames is fully processed before the next read. If the chunk holds
    /// invalid UTF-8, the complete lines ahead of the bad byte are still
    /// applied before the decode error is returned.
    pub fn feed(&mut self, chunk: &[u8], sink: &mut dyn StreamSink) -> Result<FeedStatus, ChatError> {
        if self.accumulator.is_done() {
            return Ok(FeedStatus::Done);
        }
        self.stats.chunks += 1;
        self.stats.bytes += chunk.len();
        let decoded = self.decoder.push_chunk(chunk);

        while let Some(line) = self.decoder.next_line() {
            if self.apply(line, sink) == FeedStatus::Done {
                return Ok(FeedStatus::Done);
            }
        }
        decoded?;
        Ok(FeedStatus::Open)
    }

    /// End of stream: flush the residual line.
    ///
    /// A payload that still fails to parse here cannot be recombined any
    /// further and fails the session.
    pub fn finish(&mut self, sink: &mut dyn StreamSink) -> Result<(), ChatError> {
        if self.accumulator.is_done() {
            return Ok(());
        }
        let Some(line) = self.decoder.finish()? else {
            return Ok(());
        };
        self.stats.lines += 1;

        match self.accumulator.process_line(line) {
            LineAction::Appended => {
                sink.on_update(self.accumulator.text());
                Ok(())
            }
            LineAction::Requeue(fragment) => Err(ChatError::PayloadParse {
                message: self
                    .accumulator
                    .last_parse_error()
                    .unwrap_or("incomplete payload at end of stream")
                    .to_string(),
                fragment,
            }),
            LineAction::Ignored | LineAction::Done => Ok(()),
        }
    }

    fn apply(&mut self, line: String, sink: &mut dyn StreamSink) -> FeedStatus {
        self.stats.lines += 1;
        match self.accumulator.process_line(line) {
            LineAction::Ignored => FeedStatus::Open,
            LineAction::Appended => {
                sink.on_update(self.accumulator.text());
                FeedStatus::Open
            }
            LineAction::Done => FeedStatus::Done,
            LineAction::Requeue(line) => {
                self.stats.requeued += 1;
                self.decoder.requeue(line);
                FeedStatus::Open
            }
        }
    }

    /// Drive the session over `body` until it ends, then report the outcome.
    ///
    /// The body is dropped (releasing the connection) as soon as the
    /// sentinel is seen or an error occurs. `sink.on_finish` is called
    /// exactly once.
    pub async fn run(mut self, mut body: ByteStream, sink: &mut dyn StreamSink) -> ReplyOutcome {
        let result = self.pump(&mut body, sink).await;
        drop(body);

        let stats = self.stats();
        let text = self.accumulator.into_text();
        let outcome = match result {
            Ok(()) => {
                tracing::debug!(
                    session = %self.id,
                    bytes = stats.bytes,
                    fragments = stats.fragments,
                    requeued = stats.requeued,
                    "chat stream completed"
                );
                ReplyOutcome::Completed { text }
            }
            Err(error) => {
                match &error {
                    ChatError::DecodeFault { .. } => {
                        tracing::error!(
                            session = %self.id,
                            code = error.error_code(),
                            %error,
                            "chat stream decode fault"
                        )
                    }
                    _ => tracing::warn!(
                        session = %self.id,
                        code = error.error_code(),
                        %error,
                        "chat stream failed"
                    ),
                }
                ReplyOutcome::Failed { error, text }
            }
        };
        sink.on_finish(&outcome);
        outcome
    }

    /// Report a failure that happened before any stream was opened.
    pub fn fail(self, error: ChatError, sink: &mut dyn StreamSink) -> ReplyOutcome {
        tracing::warn!(
            session = %self.id,
            code = error.error_code(),
            %error,
            "chat request failed"
        );
        let outcome = ReplyOutcome::Failed {
            error,
            text: self.accumulator.into_text(),
        };
        sink.on_finish(&outcome);
        outcome
    }

    async fn pump(&mut self, body: &mut ByteStream, sink: &mut dyn StreamSink) -> Result<(), ChatError> {
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(ChatError::Transport)?;
            if self.feed(&chunk, sink)? == FeedStatus::Done {
                return Ok(());
            }
        }
        self.finish(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::RecordingSink;
    use crate::traits::HttpError;
    use bytes::Bytes;

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    fn body(chunks: Vec<Result<&'static str, HttpError>>) -> ByteStream {
        Box::pin(futures::stream::iter(
            chunks.into_iter().map(|c| c.map(Bytes::from)),
        ))
    }

    fn owned_body(chunks: Vec<String>) -> ByteStream {
        Box::pin(futures::stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from(c))),
        ))
    }

    #[test]
    fn test_feed_processes_all_lines_in_chunk() {
        let mut session = StreamSession::new();
        let mut sink = RecordingSink::new();
        let chunk = format!("{}{}", frame("a"), frame("b"));
        let status = session.feed(chunk.as_bytes(), &mut sink).unwrap();
        assert_eq!(status, FeedStatus::Open);
        assert_eq!(sink.updates, vec!["a", "ab"]);
    }

    #[test]
    fn test_feed_reports_done() {
        let mut session = StreamSession::new();
        let mut sink = RecordingSink::new();
        let chunk = format!("{}data: [DONE]\n{}", frame("a"), frame("ignored"));
        assert_eq!(session.feed(chunk.as_bytes(), &mut sink).unwrap(), FeedStatus::Done);
        assert_eq!(session.text(), "a");
        assert_eq!(
            session.feed(frame("later").as_bytes(), &mut sink).unwrap(),
            FeedStatus::Done
        );
        assert_eq!(sink.updates, vec!["a"]);
    }

    #[test]
    fn test_stats() {
        let mut session = StreamSession::new();
        let mut sink = RecordingSink::new();
        let chunk = format!(": ping\n\n{}data: {{\"choices\":\n[]}}\n", frame("x"));
        session.feed(chunk.as_bytes(), &mut sink).unwrap();
        let stats = session.stats();
        assert_eq!(stats.chunks, 1);
        assert_eq!(stats.bytes, chunk.len());
        assert_eq!(stats.fragments, 1);
        assert_eq!(stats.requeued, 1);
        assert_eq!(stats.lines, 5);
    }

    #[tokio::test]
    async fn test_run_completes_on_done() {
        let mut sink = RecordingSink::new();
        let outcome = StreamSession::new()
            .run(
                body(vec![
                    Ok("data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n"),
                    Ok("data: [DONE]\n"),
                ]),
                &mut sink,
            )
            .await;
        assert_eq!(
            outcome,
            ReplyOutcome::Completed {
                text: "Hi".to_string()
            }
        );
        assert_eq!(sink.outcomes, vec![outcome]);
    }

    #[tokio::test]
    async fn test_run_completes_on_end_of_stream_without_sentinel() {
        let mut sink = RecordingSink::new();
        let outcome = StreamSession::new()
            .run(owned_body(vec![frame("a"), frame("b").trim_end().to_string()]), &mut sink)
            .await;
        assert!(outcome.is_completed());
        assert_eq!(outcome.text(), "ab");
        assert_eq!(sink.updates, vec!["a", "ab"]);
    }

    #[tokio::test]
    async fn test_run_transport_error_keeps_text() {
        let mut sink = RecordingSink::new();
        let outcome = StreamSession::new()
            .run(
                body(vec![
                    Ok("data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n"),
                    Err(HttpError::Io("connection reset".to_string())),
                ]),
                &mut sink,
            )
            .await;
        assert_eq!(
            outcome,
            ReplyOutcome::Failed {
                error: ChatError::Transport(HttpError::Io("connection reset".to_string())),
                text: "partial".to_string(),
            }
        );
        assert_eq!(sink.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn test_run_decode_fault_keeps_text() {
        let mut sink = RecordingSink::new();
        let stream: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from(frame("ok"))),
            Ok(Bytes::from_static(b"data: \xff\n")),
        ]));
        let outcome = StreamSession::new().run(stream, &mut sink).await;
        assert!(matches!(
            outcome.error(),
            Some(ChatError::DecodeFault { .. })
        ));
        assert_eq!(outcome.text(), "ok");
    }

    #[test]
    fn test_feed_applies_lines_before_invalid_utf8() {
        let mut session = StreamSession::new();
        let mut sink = RecordingSink::new();
        let mut chunk = frame("ok").into_bytes();
        chunk.extend_from_slice(b"data: \xff\n");

        let err = session.feed(&chunk, &mut sink).unwrap_err();
        assert!(matches!(err, ChatError::DecodeFault { .. }));
        assert_eq!(session.text(), "ok");
        assert_eq!(sink.updates, vec!["ok"]);
    }

    #[test]
    fn test_feed_done_before_invalid_utf8_completes() {
        let mut session = StreamSession::new();
        let mut sink = RecordingSink::new();
        let mut chunk = frame("ok").into_bytes();
        chunk.extend_from_slice(b"data: [DONE]\n\xff");

        let status = session.feed(&chunk, &mut sink).unwrap();
        assert_eq!(status, FeedStatus::Done);
        assert_eq!(session.text(), "ok");
    }

    #[tokio::test]
    async fn test_run_decode_fault_in_single_chunk_keeps_text() {
        let mut sink = RecordingSink::new();
        let mut chunk = frame("ok").into_bytes();
        chunk.extend_from_slice(b"data: \xff\n");
        let stream: ByteStream = Box::pin(futures::stream::iter(vec![Ok(Bytes::from(chunk))]));

        let outcome = StreamSession::new().run(stream, &mut sink).await;
        assert!(matches!(
            outcome.error(),
            Some(ChatError::DecodeFault { .. })
        ));
        assert_eq!(outcome.text(), "ok");
        assert_eq!(sink.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn test_run_residual_unparsable_payload_fails() {
        let mut sink = RecordingSink::new();
        let outcome = StreamSession::new()
            .run(
                owned_body(vec![frame("kept"), "data: {\"choices\":[\n".to_string()]),
                &mut sink,
            )
            .await;
        match &outcome {
            ReplyOutcome::Failed {
                error: ChatError::PayloadParse { fragment, .. },
                text,
            } => {
                assert_eq!(fragment, "data: {\"choices\":[");
                assert_eq!(text, "kept");
            }
            other => panic!("expected payload failure, got {:?}", other),
        }
    }

    #[test]
    fn test_fail_reports_once() {
        let mut sink = RecordingSink::new();
        let outcome = StreamSession::new().fail(ChatError::NoStreamAvailable, &mut sink);
        assert_eq!(outcome.error(), Some(&ChatError::NoStreamAvailable));
        assert_eq!(sink.outcomes, vec![outcome]);
        assert!(sink.updates.is_empty());
    }
}
