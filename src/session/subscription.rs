//! Live, cancelable view of a running session.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{ReplyEvent, ReplyOutcome};
use crate::traits::StreamSink;

/// Sink that forwards notifications into an unbounded channel.
///
/// Sending never blocks; notifications for a dropped receiver are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ReplyEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ReplyEvent>) -> Self {
        Self { tx }
    }
}

impl StreamSink for ChannelSink {
    fn on_update(&mut self, text: &str) {
        let _ = self.tx.send(ReplyEvent::Updated(text.to_string()));
    }

    fn on_finish(&mut self, outcome: &ReplyOutcome) {
        let _ = self.tx.send(ReplyEvent::Finished(outcome.clone()));
    }
}

/// Handle to a session running on the tokio runtime.
///
/// Yields zero or more [`ReplyEvent::Updated`] followed by one
/// [`ReplyEvent::Finished`]. Cancelling (or dropping the handle) aborts the
/// session task, which drops the response stream and its connection.
/// Events already queued stay readable after cancellation; no new ones
/// are produced.
#[derive(Debug)]
pub struct ReplySubscription {
    session_id: Uuid,
    events: mpsc::UnboundedReceiver<ReplyEvent>,
    task: JoinHandle<()>,
}

impl ReplySubscription {
    pub(crate) fn new(
        session_id: Uuid,
        events: mpsc::UnboundedReceiver<ReplyEvent>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            session_id,
            events,
            task,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Next notification, or `None` once the session has ended or was cancelled.
    pub async fn next(&mut self) -> Option<ReplyEvent> {
        self.events.recv().await
    }

    /// Abandon the session.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            tracing::debug!(session = %self.session_id, "cancelling chat session");
        }
        self.task.abort();
    }

    /// Whether the session task has stopped (finished or cancelled).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the terminal notification, skipping updates.
    ///
    /// Returns `None` if the session was cancelled before finishing.
    pub async fn outcome(mut self) -> Option<ReplyOutcome> {
        while let Some(event) = self.events.recv().await {
            if let ReplyEvent::Finished(outcome) = event {
                return Some(outcome);
            }
        }
        None
    }
}

impl Stream for ReplySubscription {
    type Item = ReplyEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

impl Drop for ReplySubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    #[test]
    fn test_channel_sink_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(tx);
        sink.on_update("a");
        sink.on_finish(&ReplyOutcome::Completed {
            text: "a".to_string(),
        });
        assert_eq!(rx.try_recv().unwrap(), ReplyEvent::Updated("a".to_string()));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ReplyEvent::Finished(ReplyOutcome::Completed { .. })
        ));
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        sink.on_update("ignored");
        sink.on_finish(&ReplyOutcome::Failed {
            error: ChatError::NoStreamAvailable,
            text: String::new(),
        });
    }

    #[tokio::test]
    async fn test_outcome_skips_updates() {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut sink = ChannelSink::new(tx);
            sink.on_update("x");
            sink.on_finish(&ReplyOutcome::Completed {
                text: "x".to_string(),
            });
        });
        let subscription = ReplySubscription::new(Uuid::new_v4(), rx, task);
        assert_eq!(
            subscription.outcome().await,
            Some(ReplyOutcome::Completed {
                text: "x".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_cancel_closes_events() {
        let (tx, rx) = mpsc::unbounded_channel::<ReplyEvent>();
        let task = tokio::spawn(async move {
            let _tx = tx;
            futures::future::pending::<()>().await;
        });
        let mut subscription = ReplySubscription::new(Uuid::new_v4(), rx, task);
        subscription.cancel();
        assert_eq!(subscription.next().await, None);
    }
}
