//! Per-connection subscription manager.
//!
//! Tracks which feeds a WebSocket client is subscribed to and provides
//! server-side update filtering.

use std::collections::HashSet;

use crate::domain::{FeedKind, FeedUpdate};

/// Manages the set of feed subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed feeds. If `subscribe_all` is true, this set is ignored.
    feeds: HashSet<FeedKind>,
    /// Whether the client subscribes to all feeds (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds feeds to the subscription set.
    pub fn subscribe(&mut self, feeds: &[FeedKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.feeds.extend(feeds.iter().copied());
    }

    /// Removes feeds from the subscription set.
    pub fn unsubscribe(&mut self, feeds: &[FeedKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for feed in feeds {
            self.feeds.remove(feed);
        }
    }

    /// Returns `true` if `update` should be forwarded.
    ///
    /// Updates that belong to no feed (wallet changes) reach every client
    /// with at least one subscription.
    #[must_use]
    pub fn matches(&self, update: &FeedUpdate) -> bool {
        match update.feed() {
            Some(feed) => self.subscribe_all || self.feeds.contains(&feed),
            None => self.is_active(),
        }
    }

    /// Returns `true` if anything is subscribed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscribe_all || !self.feeds.is_empty()
    }

    /// Returns the explicitly subscribed feeds.
    #[must_use]
    pub fn feeds(&self) -> Vec<FeedKind> {
        FeedKind::ALL
            .into_iter()
            .filter(|feed| self.feeds.contains(feed))
            .collect()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
