//! Reply accumulation from decoded lines.

use super::events::{classify_line, SseLine};
use super::payloads::{parse_chunk, PayloadError};

/// What the session should do after a line was processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Nothing changed.
    Ignored,
    /// A fragment was appended; the sink should see the new text.
    Appended,
    /// The termination sentinel was seen.
    Done,
    /// The payload did not parse; hand this line back to the decoder.
    Requeue(String),
}

/// Append-only reply text for one session.
#[derive(Debug, Default)]
pub struct ReplyAccumulator {
    text: String,
    done: bool,
    fragments: usize,
    abandoned: usize,
    last_parse_error: Option<String>,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the per-line rules to one decoded line.
    ///
    /// A line containing `\n` is a re-queued fragment joined to its
    /// successor. If the successor begins a fresh frame the fragment is
    /// abandoned and the frame processed on its own; if the successor is a
    /// comment the fragment stays queued.
    pub fn process_line(&mut self, line: String) -> LineAction {
        if self.done {
            return LineAction::Ignored;
        }

        if let Some(split) = line.rfind('\n') {
            let tail = classify_line(&line[split + 1..]);
            let (fresh_frame, comment) = (tail.starts_frame(), matches!(tail, SseLine::Comment(_)));

            if comment {
                let mut head = line;
                head.truncate(split);
                return LineAction::Requeue(head);
            }
            if fresh_frame {
                let fresh = line[split + 1..].to_string();
                self.abandoned += 1;
                tracing::warn!(
                    fragment = %preview(&line[..split]),
                    "abandoning unparsable event fragment"
                );
                return self.process_line(fresh);
            }
        }

        let parsed = match classify_line(&line) {
            SseLine::Blank | SseLine::Comment(_) | SseLine::Other(_) => {
                return LineAction::Ignored
            }
            SseLine::Done => {
                self.done = true;
                return LineAction::Done;
            }
            SseLine::Data(payload) => parse_chunk(payload),
        };

        match parsed {
            Ok(chunk) => match chunk.content() {
                Some(fragment) => {
                    self.text.push_str(fragment);
                    self.fragments += 1;
                    self.last_parse_error = None;
                    LineAction::Appended
                }
                None => LineAction::Ignored,
            },
            Err(PayloadError::NotARecord(message)) => {
                tracing::debug!(%message, "skipping payload that is not a chunk record");
                LineAction::Ignored
            }
            Err(PayloadError::Malformed(message)) => {
                tracing::debug!(%message, "re-queueing incomplete payload");
                self.last_parse_error = Some(message);
                LineAction::Requeue(line)
            }
        }
    }

    /// The reply accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the termination sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of fragments appended.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Number of unparsable fragments dropped at a fresh frame boundary.
    pub fn abandoned(&self) -> usize {
        self.abandoned
    }

    /// Parser message for the most recent re-queued payload.
    pub fn last_parse_error(&self) -> Option<&str> {
        self.last_parse_error.as_deref()
    }

    /// Consume the accumulator, keeping the text.
    pub fn into_text(self) -> String {
        self.text
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 80;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
