//! Incremental frame decoder.
//!
//! Turns raw body chunks into complete lines. Chunks may split a line, or a
//! multi-byte UTF-8 character, at any byte; incomplete tails are buffered
//! until the next chunk arrives.

use thiserror::Error;

use crate::error::ChatError;

/// A chunk could not be decoded as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Bytes that can never form a valid character.
    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 { offset: usize },
    /// The stream ended inside a multi-byte character.
    #[error("stream ended inside a multi-byte character at byte offset {offset}")]
    Truncated { offset: usize },
}

impl From<DecodeError> for ChatError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidUtf8 { offset } | DecodeError::Truncated { offset } => {
                ChatError::DecodeFault { offset }
            }
        }
    }
}

/// Stateful line splitter for one stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Decoded text not yet split into a complete line
    pending: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    partial: Vec<u8>,
    /// A re-queued line, prefixed to the next line yielded
    carry: Option<String>,
    /// Start of the text not yet taken as a line
    head: usize,
    /// `pending[head..scan_from]` is known to hold no newline
    scan_from: usize,
    /// Total bytes pushed so far
    bytes_seen: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk` and append it to the pending buffer.
    ///
    /// An incomplete multi-byte character at the end of the chunk is held
    /// back until the next call. On invalid UTF-8 the valid text ahead of
    /// the bad byte is still appended, so complete lines before it can be
    /// taken with [`next_line`](Self::next_line).
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<(), DecodeError> {
        self.compact();
        let base = self.bytes_seen - self.partial.len();
        self.bytes_seen += chunk.len();

        let mut bytes = std::mem::take(&mut self.partial);
        bytes.extend_from_slice(chunk);

        let (text, rest) = match std::str::from_utf8(&bytes) {
            Ok(text) => (text, &[][..]),
            Err(e) => {
                let (valid, tail) = bytes.split_at(e.valid_up_to());
                // `valid` was checked by the failed conversion.
                let valid = std::str::from_utf8(valid).unwrap_or_default();
                if e.error_len().is_some() {
                    self.pending.push_str(valid);
                    return Err(DecodeError::InvalidUtf8 {
                        offset: base + valid.len(),
                    });
                }
                (valid, tail)
            }
        };
        self.pending.push_str(text);
        self.partial = rest.to_vec();
        Ok(())
    }

    /// Take the next complete line, without its `\n` or trailing `\r`.
    ///
    /// Returns `None` once the buffer holds no complete line. If a line was
    /// re-queued, it is returned joined to the next line with `\n`.
    pub fn next_line(&mut self) -> Option<String> {
        let Some(rel) = self.pending[self.scan_from..].find('\n') else {
            self.scan_from = self.pending.len();
            return None;
        };
        let end = self.scan_from + rel;

        let mut line = self.pending[self.head..end].to_string();
        self.head = end + 1;
        self.scan_from = self.head;
        if line.ends_with('\r') {
            line.pop();
        }
        Some(self.rejoin(line))
    }

    /// Hand a line back so it is recombined with the line that follows it.
    pub fn requeue(&mut self, line: String) {
        self.carry = Some(match self.carry.take() {
            Some(earlier) => join(earlier, &line),
            None => line,
        });
    }

    /// Whether a re-queued line is waiting for its continuation.
    pub fn has_carry(&self) -> bool {
        self.carry.is_some()
    }

    /// Text buffered but not yet yielded as a line.
    pub fn pending(&self) -> &str {
        &self.pending[self.head..]
    }

    /// End of stream: flush whatever is left as one final line.
    ///
    /// The residual buffer (joined to any re-queued line) is returned even
    /// without a trailing newline. A dangling partial character is an error.
    pub fn finish(&mut self) -> Result<Option<String>, DecodeError> {
        if !self.partial.is_empty() {
            return Err(DecodeError::Truncated {
                offset: self.bytes_seen - self.partial.len(),
            });
        }

        self.compact();
        let mut rest = std::mem::take(&mut self.pending);
        self.scan_from = 0;
        if rest.ends_with('\r') {
            rest.pop();
        }

        if rest.is_empty() {
            return Ok(self.carry.take());
        }
        Ok(Some(self.rejoin(rest)))
    }

    /// Drop the text already taken as lines. Runs once per chunk, not per line.
    fn compact(&mut self) {
        if self.head > 0 {
            self.pending.drain(..self.head);
            self.scan_from -= self.head;
            self.head = 0;
        }
    }

    fn rejoin(&mut self, line: String) -> String {
        match self.carry.take() {
            Some(carry) => join(carry, &line),
            None => line,
        }
    }
}

fn join(mut head: String, tail: &str) -> String {
    head.push('\n');
    head.push_str(tail);
    head
}
