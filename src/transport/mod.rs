//! Node transport: Ethereum pub/sub subscriptions over an alloy WebSocket
//! provider.

pub mod node_ws;

pub use node_ws::{NodeFeed, NodeWsSource};
