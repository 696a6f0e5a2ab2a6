//! Updates broadcast to WebSocket clients whenever a feed changes.
//!
//! Every delivered batch, lifecycle transition and reported error emits a
//! [`FeedUpdate`] through the [`super::EventBus`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{BlockEvent, FeedKind, PendingTx};
use crate::session::LifecycleState;

/// Change notification emitted by a feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "update_type", rename_all = "snake_case")]
pub enum FeedUpdate {
    /// A batch of pending transaction hashes arrived.
    PendingTransactions {
        /// Hashes in delivery order.
        hashes: Vec<PendingTx>,
        /// Total number of transactions seen by the session so far.
        event_count: u64,
        /// When the batch was applied.
        timestamp: DateTime<Utc>,
    },

    /// A batch of new blocks arrived.
    NewBlocks {
        /// Blocks in delivery order.
        blocks: Vec<BlockEvent>,
        /// Total number of blocks seen by the session so far.
        event_count: u64,
        /// When the batch was applied.
        timestamp: DateTime<Utc>,
    },

    /// A session started or stopped.
    SessionChanged {
        /// Affected feed.
        feed: FeedKind,
        /// State after the transition.
        state: LifecycleState,
        /// Time of the transition.
        timestamp: DateTime<Utc>,
    },

    /// A session reported an error.
    FeedError {
        /// Affected feed.
        feed: FeedKind,
        /// Error description.
        message: String,
        /// Time the error was reported.
        timestamp: DateTime<Utc>,
    },

    /// The wallet gate opened or closed.
    WalletChanged {
        /// Whether a wallet is now connected.
        connected: bool,
        /// Time of the change.
        timestamp: DateTime<Utc>,
    },
}

impl FeedUpdate {
    /// Returns the feed this update belongs to, or `None` for
    /// dashboard-wide updates.
    #[must_use]
    pub const fn feed(&self) -> Option<FeedKind> {
        match self {
            Self::PendingTransactions { .. } => Some(FeedKind::Transactions),
            Self::NewBlocks { .. } => Some(FeedKind::Blocks),
            Self::SessionChanged { feed, .. } | Self::FeedError { feed, .. } => Some(*feed),
            Self::WalletChanged { .. } => None,
        }
    }

    /// Returns the update type as a static string slice.
    #[must_use]
    pub const fn update_type_str(&self) -> &'static str {
        match self {
            Self::PendingTransactions { .. } => "pending_transactions",
            Self::NewBlocks { .. } => "new_blocks",
            Self::SessionChanged { .. } => "session_changed",
            Self::FeedError { .. } => "feed_error",
            Self::WalletChanged { .. } => "wallet_changed",
        }
    }
}
