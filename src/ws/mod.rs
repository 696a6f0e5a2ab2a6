//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes [`crate::domain::FeedUpdate`]s
//! to clients that subscribed to the matching feeds.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
