//! Domain layer: feed items, bounded windows, wallet gate and event bus.
//!
//! This module contains the data model shared by the sessions, the
//! dashboard and the HTTP/WebSocket surfaces.

pub mod event_bus;
pub mod event_window;
pub mod explorer;
pub mod feed_event;
pub mod feed_update;
pub mod wallet;

pub use event_bus::EventBus;
pub use event_window::EventWindow;
pub use explorer::ExplorerLinks;
pub use feed_event::{BlockEvent, FeedItem, FeedKind, PendingTx};
pub use feed_update::FeedUpdate;
pub use wallet::WalletGate;
