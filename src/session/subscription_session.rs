//! Start/stop lifecycle around one streaming subscription.
//!
//! A [`SubscriptionSession`] owns the live [`Subscription`] while
//! listening, the running item count and the bounded display window. The
//! count and window survive `stop`; only the subscription is released.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::source::{FeedSink, FeedSource, FeedState, Subscription, lock_feed};
use crate::domain::{EventBus, FeedItem, FeedKind, FeedUpdate};
use crate::error::MonitorError;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No subscription is held.
    #[default]
    Idle,
    /// A subscription is live and delivering batches.
    Listening,
}

impl LifecycleState {
    /// Label of the single toggle control.
    #[must_use]
    pub const fn toggle_label(&self) -> &'static str {
        match self {
            Self::Idle => "Start Listening",
            Self::Listening => "Stop Listening",
        }
    }

    /// Action the toggle control performs.
    #[must_use]
    pub const fn toggle_action(&self) -> &'static str {
        match self {
            Self::Idle => "start",
            Self::Listening => "stop",
        }
    }
}

/// Point-in-time copy of a session, used for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot<T> {
    /// Lifecycle state.
    pub state: LifecycleState,
    /// Items delivered over the session's lifetime.
    pub event_count: u64,
    /// Window contents, newest-first.
    pub items: Vec<T>,
    /// Most recent error, cleared by the next successful start.
    pub last_error: Option<String>,
}

/// One feed's subscription, count and window.
///
/// # State machine
///
/// | From      | Event         | To        |
/// |-----------|---------------|-----------|
/// | Idle      | start ok      | Listening |
/// | Idle      | start failed  | Idle      |
/// | Listening | start         | Listening |
/// | Listening | stop          | Idle      |
/// | Listening | stream ended  | Idle      |
/// | Idle      | stop          | Idle      |
///
/// The session is listening while it holds a subscription whose sink is
/// still the active generation. A stream that ends on its own retires its
/// generation, which makes the session idle and lets `start` reconnect.
#[derive(Debug)]
pub struct SubscriptionSession<T> {
    subscription: Option<Subscription>,
    feed: Arc<Mutex<FeedState<T>>>,
    next_generation: u64,
    event_bus: EventBus,
}

impl<T: FeedItem> SubscriptionSession<T> {
    /// Creates an idle session with an empty window of `capacity` items.
    #[must_use]
    pub fn new(capacity: usize, event_bus: EventBus) -> Self {
        Self {
            subscription: None,
            feed: Arc::new(Mutex::new(FeedState::new(capacity))),
            next_generation: 0,
            event_bus,
        }
    }

    /// Feed this session serves.
    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        T::KIND
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state_of(&lock_feed(&self.feed))
    }

    /// Returns `true` while a live subscription is held.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state() == LifecycleState::Listening
    }

    fn state_of(&self, feed: &FeedState<T>) -> LifecycleState {
        if self.subscription.is_some() && feed.active_generation.is_some() {
            LifecycleState::Listening
        } else {
            LifecycleState::Idle
        }
    }

    /// Total number of items delivered since the session was created.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        lock_feed(&self.feed).event_count
    }

    /// Most recent error, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        lock_feed(&self.feed).last_error.clone()
    }

    /// Copies the state needed to render the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<T> {
        let feed = lock_feed(&self.feed);
        SessionSnapshot {
            state: self.state_of(&feed),
            event_count: feed.event_count,
            items: feed.window.to_vec(),
            last_error: feed.last_error.clone(),
        }
    }

    /// Opens a connection from `source` and subscribes to it.
    ///
    /// Does nothing if the session is already listening.
    ///
    /// # Errors
    ///
    /// Returns the connect or subscribe failure. The session stays idle and
    /// its count and window are untouched.
    pub async fn start(&mut self, source: &dyn FeedSource<T>) -> Result<(), MonitorError> {
        if self.is_listening() {
            tracing::debug!(feed = %T::KIND, "start ignored, already listening");
            return Ok(());
        }

        self.release_ended();

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        {
            let mut feed = lock_feed(&self.feed);
            feed.active_generation = Some(generation);
            feed.last_error = None;
        }

        let connection = match source.connect().await {
            Ok(connection) => connection,
            Err(err) => return Err(self.fail_start(err)),
        };
        let sink = FeedSink::new(generation, Arc::clone(&self.feed), self.event_bus.clone());
        let subscription = match connection.subscribe(sink).await {
            Ok(subscription) => subscription,
            Err(err) => return Err(self.fail_start(err)),
        };

        tracing::info!(feed = %T::KIND, subscription = %subscription.id(), "listening");
        self.subscription = Some(subscription);
        self.publish_state();
        Ok(())
    }

    /// Releases the subscription and returns to idle.
    ///
    /// Does nothing if the session is idle. The count and window are kept.
    /// The handle of a stream that already ended is released quietly.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Teardown`] (or whatever the transport
    /// reports) if cancelling failed. The session is idle either way.
    pub fn stop(&mut self) -> Result<(), MonitorError> {
        let was_listening = lock_feed(&self.feed).active_generation.take().is_some();
        let Some(subscription) = self.subscription.take() else {
            return Ok(());
        };
        if !was_listening {
            drop(subscription);
            return Ok(());
        }
        self.publish_state();

        let id = subscription.id().to_string();
        match subscription.unsubscribe() {
            Ok(()) => {
                tracing::info!(feed = %T::KIND, subscription = %id, "stopped listening");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    feed = %T::KIND,
                    subscription = %id,
                    error = %err,
                    "unsubscribe failed"
                );
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Starts when idle, stops when listening. Returns the new state.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying [`Self::start`] or
    /// [`Self::stop`].
    pub async fn toggle(
        &mut self,
        source: &dyn FeedSource<T>,
    ) -> Result<LifecycleState, MonitorError> {
        if self.is_listening() {
            self.stop()?;
        } else {
            self.start(source).await?;
        }
        Ok(self.state())
    }

    /// Drops the handle left behind by a stream that ended on its own.
    fn release_ended(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            tracing::debug!(
                feed = %T::KIND,
                subscription = %subscription.id(),
                "releasing ended subscription"
            );
            drop(subscription);
        }
    }

    fn fail_start(&mut self, err: MonitorError) -> MonitorError {
        lock_feed(&self.feed).active_generation = None;
        tracing::warn!(feed = %T::KIND, error = %err, "failed to start listening");
        self.record_error(&err);
        err
    }

    fn record_error(&self, err: &MonitorError) {
        lock_feed(&self.feed).last_error = Some(err.to_string());
        self.event_bus.publish(FeedUpdate::FeedError {
            feed: T::KIND,
            message: err.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn publish_state(&self) {
        self.event_bus.publish(FeedUpdate::SessionChanged {
            feed: T::KIND,
            state: self.state(),
            timestamp: Utc::now(),
        });
    }
}
