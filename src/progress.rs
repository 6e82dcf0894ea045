//! C10: Progress Broadcaster. Best-effort "found/progressed/complete" events.
//!
//! Backed by `tokio::sync::broadcast`, whose publisher never blocks on a slow
//! subscriber — a lagging receiver simply misses older messages instead of
//! stalling the crawl, which is exactly the "best-effort, never blocks"
//! contract this component needs.

use crate::model::{ProgressEvent, ProgressKind};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

pub struct ProgressBroadcaster {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBroadcaster {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future progress events. Events published before this
    /// call are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. A send with no subscribers is a no-op, not an error.
    pub fn publish(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }

    pub fn publish_started(&self, queue_count: usize) {
        self.publish(ProgressEvent {
            kind: ProgressKind::Started,
            crawled_count: 0,
            queue_count,
            current_depth: 0,
            message: "crawl started".to_string(),
        });
    }

    pub fn publish_progress(&self, crawled_count: usize, queue_count: usize, current_depth: usize) {
        self.publish(ProgressEvent {
            kind: ProgressKind::Progressed,
            crawled_count,
            queue_count,
            current_depth,
            message: format!("crawled {crawled_count} pages, {queue_count} queued"),
        });
    }

    pub fn publish_complete(&self, crawled_count: usize) {
        self.publish(ProgressEvent {
            kind: ProgressKind::Complete,
            crawled_count,
            queue_count: 0,
            current_depth: 0,
            message: "crawl complete".to_string(),
        });
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let broadcaster = ProgressBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        broadcaster.publish_started(3);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ProgressKind::Started);
        assert_eq!(event.queue_count, 3);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let broadcaster = ProgressBroadcaster::new();
        broadcaster.publish_complete(5);
    }
}
