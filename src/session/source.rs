//! Transport boundary consumed by [`super::SubscriptionSession`].
//!
//! A [`FeedSource`] opens connections, a [`FeedConnection`] turns itself
//! into a live [`Subscription`] that pushes batches into a
//! [`FeedSink`], and the [`Subscription`] is the only way to cancel it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use futures_util::future::BoxFuture;

use super::LifecycleState;
use crate::domain::{EventBus, EventWindow, FeedItem, FeedUpdate};
use crate::error::MonitorError;

/// Factory for streaming connections to a node.
pub trait FeedSource<T>: Send + Sync + fmt::Debug {
    /// Opens a new connection. Each call yields an independent connection.
    fn connect(&self) -> BoxFuture<'_, Result<Box<dyn FeedConnection<T>>, MonitorError>>;
}

/// An open connection that has not subscribed yet.
pub trait FeedConnection<T>: Send {
    /// Registers `sink` as the batch handler and starts delivery.
    ///
    /// The connection is consumed: from here on it is owned by the returned
    /// [`Subscription`].
    fn subscribe(
        self: Box<Self>,
        sink: FeedSink<T>,
    ) -> BoxFuture<'static, Result<Subscription, MonitorError>>;
}

type CancelFn = Box<dyn FnOnce() -> Result<(), MonitorError> + Send>;

/// Cleanup capability of a live subscription.
///
/// Cancelling consumes the value, so a released subscription can never be
/// reused. Dropping an unreleased subscription cancels it too.
pub struct Subscription {
    id: String,
    cancel: Option<CancelFn>,
}

impl Subscription {
    /// Wraps the transport's cancel routine.
    pub fn new(
        id: impl Into<String>,
        cancel: impl FnOnce() -> Result<(), MonitorError> + Send + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Identifier assigned by the transport.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cancels the subscription.
    ///
    /// # Errors
    ///
    /// Returns whatever the transport's cancel routine reports, typically
    /// [`MonitorError::Teardown`].
    pub fn unsubscribe(mut self) -> Result<(), MonitorError> {
        match self.cancel.take() {
            Some(cancel) => cancel(),
            None => Ok(()),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take()
            && let Err(err) = cancel()
        {
            tracing::warn!(
                subscription = %self.id,
                error = %err,
                "dropped subscription failed to cancel"
            );
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// Mutable feed data shared between a session and its sinks.
#[derive(Debug)]
pub(crate) struct FeedState<T> {
    /// Generation whose deliveries are accepted. `None` while idle.
    pub(crate) active_generation: Option<u64>,
    pub(crate) event_count: u64,
    pub(crate) window: EventWindow<T>,
    pub(crate) last_error: Option<String>,
}

impl<T> FeedState<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            active_generation: None,
            event_count: 0,
            window: EventWindow::new(capacity),
            last_error: None,
        }
    }
}

/// Locks feed state. The critical sections never panic halfway, so a
/// poisoned lock still holds consistent data.
pub(crate) fn lock_feed<T>(feed: &Mutex<FeedState<T>>) -> MutexGuard<'_, FeedState<T>> {
    feed.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Batch handler handed to a transport on subscribe.
///
/// Every sink is bound to one subscription generation. Once the session
/// stops or restarts, deliveries through an older sink are discarded.
pub struct FeedSink<T> {
    generation: u64,
    feed: Arc<Mutex<FeedState<T>>>,
    event_bus: EventBus,
}

impl<T: FeedItem> FeedSink<T> {
    pub(crate) fn new(
        generation: u64,
        feed: Arc<Mutex<FeedState<T>>>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            generation,
            feed,
            event_bus,
        }
    }

    /// Returns `true` while the owning session still listens through this
    /// sink.
    #[must_use]
    pub fn is_active(&self) -> bool {
        lock_feed(&self.feed).active_generation == Some(self.generation)
    }

    /// Applies a batch: bumps the running count and pushes into the window.
    ///
    /// Returns `false` if the batch was discarded because this sink has
    /// been retired.
    pub fn deliver(&self, batch: Vec<T>) -> bool {
        if batch.is_empty() {
            return self.is_active();
        }
        let event_count = {
            let mut feed = lock_feed(&self.feed);
            if feed.active_generation != Some(self.generation) {
                tracing::debug!(
                    feed = %T::KIND,
                    dropped = batch.len(),
                    "discarding batch from retired subscription"
                );
                return false;
            }
            feed.event_count = feed.event_count.saturating_add(batch.len() as u64);
            feed.window.push(batch.clone());
            feed.event_count
        };
        self.event_bus.publish(T::into_update(batch, event_count));
        true
    }

    /// Reports a per-event failure. The session keeps running; the error is
    /// shown as the feed's last error.
    pub fn report(&self, err: &MonitorError) {
        {
            let mut feed = lock_feed(&self.feed);
            if feed.active_generation != Some(self.generation) {
                return;
            }
            feed.last_error = Some(err.to_string());
        }
        tracing::warn!(feed = %T::KIND, error = %err, "feed reported an error");
        self.publish_error(err);
    }

    /// Marks the stream behind this sink as finished for good.
    ///
    /// The session turns idle without a user stop, so the next start opens
    /// a fresh connection. Does nothing for a retired sink.
    pub fn end(&self, err: &MonitorError) {
        {
            let mut feed = lock_feed(&self.feed);
            if feed.active_generation != Some(self.generation) {
                return;
            }
            feed.active_generation = None;
            feed.last_error = Some(err.to_string());
        }
        tracing::warn!(feed = %T::KIND, error = %err, "feed stream ended");
        self.publish_error(err);
        self.event_bus.publish(FeedUpdate::SessionChanged {
            feed: T::KIND,
            state: LifecycleState::Idle,
            timestamp: Utc::now(),
        });
    }

    fn publish_error(&self, err: &MonitorError) {
        self.event_bus.publish(FeedUpdate::FeedError {
            feed: T::KIND,
            message: err.to_string(),
            timestamp: Utc::now(),
        });
    }
}

impl<T> Clone for FeedSink<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            feed: Arc::clone(&self.feed),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<T> fmt::Debug for FeedSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSink")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
