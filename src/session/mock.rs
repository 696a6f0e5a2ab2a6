//! In-memory feed source used by unit tests.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;

use super::{FeedConnection, FeedSink, FeedSource, Subscription};
use crate::domain::FeedItem;
use crate::error::MonitorError;

struct MockInner<T> {
    connects: AtomicUsize,
    active: AtomicUsize,
    unsubscribes: AtomicUsize,
    fail_connect: AtomicBool,
    fail_subscribe: AtomicBool,
    fail_unsubscribe: AtomicBool,
    sinks: Mutex<Vec<FeedSink<T>>>,
}

/// Feed source whose deliveries are driven by the test.
pub(crate) struct MockSource<T> {
    inner: Arc<MockInner<T>>,
}

impl<T: FeedItem> MockSource<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(MockInner {
                connects: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                unsubscribes: AtomicUsize::new(0),
                fail_connect: AtomicBool::new(false),
                fail_subscribe: AtomicBool::new(false),
                fail_unsubscribe: AtomicBool::new(false),
                sinks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Subscriptions created and not yet cancelled.
    pub(crate) fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub(crate) fn unsubscribes(&self) -> usize {
        self.inner.unsubscribes.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_connect(&self, fail: bool) {
        self.inner.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_subscribe(&self, fail: bool) {
        self.inner.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_unsubscribe(&self, fail: bool) {
        self.inner.fail_unsubscribe.store(fail, Ordering::SeqCst);
    }

    /// Delivers through the most recent subscription's sink.
    pub(crate) fn deliver(&self, batch: Vec<T>) -> bool {
        let sink = self.sinks().last().cloned();
        sink.is_some_and(|sink| sink.deliver(batch))
    }

    /// Ends the stream of the most recent subscription, as a node hangup
    /// would.
    pub(crate) fn end(&self, err: &MonitorError) -> bool {
        let Some(sink) = self.sinks().last().cloned() else {
            return false;
        };
        sink.end(err);
        true
    }

    /// Delivers through the sink of the `index`-th subscription.
    pub(crate) fn deliver_via(&self, index: usize, batch: Vec<T>) -> bool {
        let sink = self.sinks().get(index).cloned();
        sink.is_some_and(|sink| sink.deliver(batch))
    }

    fn sinks(&self) -> std::sync::MutexGuard<'_, Vec<FeedSink<T>>> {
        self.inner.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for MockSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for MockSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSource").finish_non_exhaustive()
    }
}

impl<T: FeedItem> FeedSource<T> for MockSource<T> {
    fn connect(&self) -> BoxFuture<'_, Result<Box<dyn FeedConnection<T>>, MonitorError>> {
        Box::pin(async move {
            if self.inner.fail_connect.load(Ordering::SeqCst) {
                return Err(MonitorError::Connection("mock node unreachable".to_string()));
            }
            self.inner.connects.fetch_add(1, Ordering::SeqCst);
            let connection: Box<dyn FeedConnection<T>> = Box::new(MockConnection {
                inner: Arc::clone(&self.inner),
            });
            Ok(connection)
        })
    }
}

struct MockConnection<T> {
    inner: Arc<MockInner<T>>,
}

impl<T: FeedItem> FeedConnection<T> for MockConnection<T> {
    fn subscribe(
        self: Box<Self>,
        sink: FeedSink<T>,
    ) -> BoxFuture<'static, Result<Subscription, MonitorError>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if inner.fail_subscribe.load(Ordering::SeqCst) {
                return Err(MonitorError::Subscription("mock subscription rejected".to_string()));
            }
            let id = {
                let mut sinks = inner.sinks.lock().unwrap_or_else(PoisonError::into_inner);
                sinks.push(sink);
                format!("0x{:x}", sinks.len())
            };
            inner.active.fetch_add(1, Ordering::SeqCst);
            let cancel_inner = Arc::clone(&inner);
            Ok(Subscription::new(id, move || {
                cancel_inner.active.fetch_sub(1, Ordering::SeqCst);
                cancel_inner.unsubscribes.fetch_add(1, Ordering::SeqCst);
                if cancel_inner.fail_unsubscribe.load(Ordering::SeqCst) {
                    Err(MonitorError::Teardown("mock socket already closed".to_string()))
                } else {
                    Ok(())
                }
            }))
        })
    }
}
