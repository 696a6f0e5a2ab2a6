//! Broadcast channel for feed updates.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Sessions
//! publish a [`FeedUpdate`] for every applied batch and lifecycle change,
//! and every WebSocket connection subscribes to receive filtered updates.

use tokio::sync::broadcast;

use super::FeedUpdate;

/// Broadcast bus for [`FeedUpdate`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest updates are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FeedUpdate>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an update to all subscribers.
    ///
    /// Returns the number of receivers that received the update.
    /// If there are no active receivers, the update is silently dropped.
    pub fn publish(&self, update: FeedUpdate) -> usize {
        self.sender.send(update).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedUpdate> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::FeedKind;
    use chrono::Utc;

    fn make_update() -> FeedUpdate {
        FeedUpdate::FeedError {
            feed: FeedKind::Transactions,
            message: "boom".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(make_update()), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_update() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish(make_update());

        let Ok(update) = rx.recv().await else {
            panic!("expected to receive update");
        };
        assert_eq!(update.feed(), Some(FeedKind::Transactions));
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.receiver_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}
