//! Feed item types: pending transaction identifiers and block summaries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::FeedUpdate;
use crate::error::MonitorError;

/// Display format for block timestamps.
pub const BLOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// The two live feeds shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Transactions seen by the node before inclusion in a block.
    Transactions,
    /// Newly mined blocks.
    Blocks,
}

impl FeedKind {
    /// Both feeds, in display order.
    pub const ALL: [Self; 2] = [Self::Transactions, Self::Blocks];

    /// Path segment and wire name of the feed.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Blocks => "blocks",
        }
    }

    /// Section heading shown on the dashboard.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Transactions => "Pending Transactions",
            Self::Blocks => "New Blocks",
        }
    }

    /// Placeholder shown while listening with nothing received yet.
    #[must_use]
    pub const fn listening_message(&self) -> &'static str {
        match self {
            Self::Transactions => "Listening for pending transactions...",
            Self::Blocks => "Listening for new blocks...",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transactions" | "pending_transactions" | "txs" => Ok(Self::Transactions),
            "blocks" | "new_blocks" => Ok(Self::Blocks),
            other => Err(MonitorError::UnknownFeed(other.to_string())),
        }
    }
}

/// Opaque identifier of a pending transaction (its hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PendingTx(String);

impl PendingTx {
    /// Wraps a transaction hash.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PendingTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Summary of a newly mined block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BlockEvent {
    /// Block number.
    pub number: u64,
    /// Number of transactions included in the block.
    pub transaction_count: u64,
    /// Time declared by the block itself.
    pub timestamp: DateTime<Utc>,
}

impl BlockEvent {
    /// Builds a block summary from the block's unix timestamp in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::MalformedEvent`] if the timestamp is outside
    /// the range `chrono` can represent.
    pub fn from_unix(
        number: u64,
        transaction_count: u64,
        unix_secs: u64,
    ) -> Result<Self, MonitorError> {
        let secs = i64::try_from(unix_secs).map_err(|_| {
            MonitorError::MalformedEvent(format!("block {number} timestamp {unix_secs}"))
        })?;
        let timestamp = Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
            MonitorError::MalformedEvent(format!("block {number} timestamp {unix_secs}"))
        })?;
        Ok(Self {
            number,
            transaction_count,
            timestamp,
        })
    }

    /// Block time formatted for display.
    #[must_use]
    pub fn observed_at(&self) -> String {
        self.timestamp.format(BLOCK_TIME_FORMAT).to_string()
    }
}

/// An item type carried by one of the feeds.
///
/// Ties each item type to its [`FeedKind`] and to the [`FeedUpdate`]
/// published when a batch of it arrives.
pub trait FeedItem: Clone + Send + Sync + 'static {
    /// Feed this item belongs to.
    const KIND: FeedKind;

    /// Wraps a freshly delivered batch for the event bus.
    fn into_update(batch: Vec<Self>, event_count: u64) -> FeedUpdate;
}

impl FeedItem for PendingTx {
    const KIND: FeedKind = FeedKind::Transactions;

    fn into_update(batch: Vec<Self>, event_count: u64) -> FeedUpdate {
        FeedUpdate::PendingTransactions {
            hashes: batch,
            event_count,
            timestamp: Utc::now(),
        }
    }
}

impl FeedItem for BlockEvent {
    const KIND: FeedKind = FeedKind::Blocks;

    fn into_update(batch: Vec<Self>, event_count: u64) -> FeedUpdate {
        FeedUpdate::NewBlocks {
            blocks: batch,
            event_count,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn feed_kind_parses_path_segments() {
        assert_eq!("transactions".parse::<FeedKind>(), Ok(FeedKind::Transactions));
        assert_eq!("blocks".parse::<FeedKind>(), Ok(FeedKind::Blocks));
        assert!(matches!(
            "receipts".parse::<FeedKind>(),
            Err(MonitorError::UnknownFeed(_))
        ));
    }

    #[test]
    fn block_time_comes_from_block_timestamp() {
        let Ok(block) = BlockEvent::from_unix(19_000_000, 150, 1_705_000_000) else {
            panic!("valid timestamp");
        };
        assert_eq!(block.observed_at(), "2024-01-11 19:06:40 UTC");
    }

    #[test]
    fn out_of_range_timestamp_is_malformed() {
        let result = BlockEvent::from_unix(1, 0, u64::MAX);
        assert!(matches!(result, Err(MonitorError::MalformedEvent(_))));
    }

    #[test]
    fn pending_tx_serializes_as_plain_string() {
        let tx = PendingTx::new("0xabc");
        let json = serde_json::to_string(&tx).unwrap_or_default();
        assert_eq!(json, "\"0xabc\"");
    }

    #[test]
    fn item_update_carries_running_count() {
        let update = PendingTx::into_update(vec![PendingTx::new("0x1")], 42);
        assert_eq!(update.feed(), Some(FeedKind::Transactions));
        let FeedUpdate::PendingTransactions { event_count, .. } = update else {
            panic!("expected a transactions update");
        };
        assert_eq!(event_count, 42);
    }
}
