//! Render model of the dashboard.
//!
//! [`DashboardView`] is what both the HTML page and the JSON snapshot are
//! built from. It carries display-ready strings (labels, links, formatted
//! times) so that renderers stay dumb.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BlockEvent, ExplorerLinks, FeedKind, PendingTx};
use crate::session::{LifecycleState, SessionSnapshot};

/// Prompt shown while no wallet is connected.
pub const CONNECT_PROMPT: &str = "Connect your wallet to get started";

/// Placeholder shown by an idle, empty section.
pub const IDLE_EMPTY_MESSAGE: &str = "Press Start to begin";

/// The single start/stop control of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ToggleControl {
    /// Button label.
    pub label: String,
    /// `"start"` or `"stop"`.
    pub action: String,
    /// Endpoint that performs the action.
    pub endpoint: String,
}

impl ToggleControl {
    fn new(feed: FeedKind, state: LifecycleState) -> Self {
        Self {
            label: state.toggle_label().to_string(),
            action: state.toggle_action().to_string(),
            endpoint: format!("/api/v1/feeds/{feed}/{}", state.toggle_action()),
        }
    }
}

/// Fields shared by both sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SectionHeader {
    /// Feed shown by the section.
    pub feed: FeedKind,
    /// Section heading.
    pub title: String,
    /// Session lifecycle state.
    pub state: LifecycleState,
    /// Start/stop control.
    pub toggle: ToggleControl,
    /// Items received since the dashboard was created.
    pub event_count: u64,
    /// Placeholder when there is nothing to list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    /// Transient error indicator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SectionHeader {
    fn new<T>(feed: FeedKind, snapshot: &SessionSnapshot<T>) -> Self {
        let empty_message = snapshot.items.is_empty().then(|| match snapshot.state {
            LifecycleState::Listening => feed.listening_message().to_string(),
            LifecycleState::Idle => IDLE_EMPTY_MESSAGE.to_string(),
        });
        Self {
            feed,
            title: feed.title().to_string(),
            state: snapshot.state,
            toggle: ToggleControl::new(feed, snapshot.state),
            event_count: snapshot.event_count,
            empty_message,
            last_error: snapshot.last_error.clone(),
        }
    }
}

/// One pending transaction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransactionRow {
    /// Transaction hash.
    pub hash: String,
    /// Explorer link.
    pub url: String,
}

/// One row of the block table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BlockRow {
    /// Block number.
    pub number: u64,
    /// Explorer link.
    pub url: String,
    /// Transactions in the block.
    pub transaction_count: u64,
    /// Formatted block time.
    pub time: String,
}

/// Pending transactions section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransactionSection {
    /// Common section fields.
    #[serde(flatten)]
    pub header: SectionHeader,
    /// Hashes, newest-first.
    pub rows: Vec<TransactionRow>,
}

impl TransactionSection {
    /// Builds the section from a session snapshot.
    #[must_use]
    pub fn new(snapshot: &SessionSnapshot<PendingTx>, links: &ExplorerLinks) -> Self {
        Self {
            header: SectionHeader::new(FeedKind::Transactions, snapshot),
            rows: snapshot
                .items
                .iter()
                .map(|tx| TransactionRow {
                    hash: tx.to_string(),
                    url: links.tx_url(tx.as_str()),
                })
                .collect(),
        }
    }
}

/// New blocks section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BlockSection {
    /// Common section fields.
    #[serde(flatten)]
    pub header: SectionHeader,
    /// Blocks, newest-first.
    pub rows: Vec<BlockRow>,
}

impl BlockSection {
    /// Builds the section from a session snapshot.
    #[must_use]
    pub fn new(snapshot: &SessionSnapshot<BlockEvent>, links: &ExplorerLinks) -> Self {
        Self {
            header: SectionHeader::new(FeedKind::Blocks, snapshot),
            rows: snapshot
                .items
                .iter()
                .map(|block| BlockRow {
                    number: block.number,
                    url: links.block_url(block.number),
                    transaction_count: block.transaction_count,
                    time: block.observed_at(),
                })
                .collect(),
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    /// No wallet: only the prompt is shown.
    ConnectPrompt {
        /// Prompt text.
        message: String,
    },
    /// Wallet connected: both feed sections.
    Sections {
        /// Connected wallet address.
        wallet_address: String,
        /// Pending transactions.
        transactions: TransactionSection,
        /// New blocks.
        blocks: BlockSection,
    },
}

impl DashboardView {
    /// Returns `true` when the feed sections are visible.
    #[must_use]
    pub const fn shows_sections(&self) -> bool {
        matches!(self, Self::Sections { .. })
    }
}
