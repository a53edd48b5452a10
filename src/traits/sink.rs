//! Caller-supplied receiver of session notifications.

use crate::session::ReplyOutcome;

/// Receives the accumulated reply as it grows, then exactly one outcome.
///
/// Both methods are called synchronously from the session's processing
/// step and must return quickly.
pub trait StreamSink: Send {
    /// The accumulated reply grew; `text` is the full reply so far.
    fn on_update(&mut self, text: &str);

    /// The session ended. Called exactly once, after the last update.
    fn on_finish(&mut self, outcome: &ReplyOutcome);
}
