//! Subscription sessions and the transport boundary they consume.
//!
//! A session turns a [`FeedSource`] into a start/stop-controlled feed with
//! a running count and a bounded window.

pub mod source;
pub mod subscription_session;

#[cfg(test)]
pub(crate) mod mock;

pub use source::{FeedConnection, FeedSink, FeedSource, Subscription};
pub use subscription_session::{LifecycleState, SessionSnapshot, SubscriptionSession};
