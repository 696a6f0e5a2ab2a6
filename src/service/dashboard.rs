//! Dashboard: two independent feed sessions behind a wallet gate.

use std::sync::Arc;

use chrono::Utc;

use super::view::{BlockSection, CONNECT_PROMPT, DashboardView, TransactionSection};
use crate::config::MonitorConfig;
use crate::domain::{
    BlockEvent, EventBus, ExplorerLinks, FeedKind, FeedUpdate, PendingTx, WalletGate,
};
use crate::error::MonitorError;
use crate::session::{FeedSource, LifecycleState, SubscriptionSession};

/// Connection factories for both feeds.
#[derive(Debug, Clone)]
pub struct FeedSources {
    /// Source of pending transaction hashes.
    pub transactions: Arc<dyn FeedSource<PendingTx>>,
    /// Source of new blocks.
    pub blocks: Arc<dyn FeedSource<BlockEvent>>,
}

/// Owns the transaction and block sessions and the wallet gate.
///
/// Control operations take `&mut self`; the HTTP layer serializes them
/// through one async mutex. [`Dashboard::teardown`] stops both sessions
/// once, and runs on drop if it was never called.
#[derive(Debug)]
pub struct Dashboard {
    transactions: SubscriptionSession<PendingTx>,
    blocks: SubscriptionSession<BlockEvent>,
    sources: FeedSources,
    wallet: WalletGate,
    explorer: ExplorerLinks,
    event_bus: EventBus,
    torn_down: bool,
}

impl Dashboard {
    /// Creates a dashboard with idle sessions sized from `config`.
    #[must_use]
    pub fn new(sources: FeedSources, config: &MonitorConfig, event_bus: EventBus) -> Self {
        Self {
            transactions: SubscriptionSession::new(config.tx_window_capacity, event_bus.clone()),
            blocks: SubscriptionSession::new(config.block_window_capacity, event_bus.clone()),
            sources,
            wallet: WalletGate::new(),
            explorer: ExplorerLinks::new(config.explorer_url.clone()),
            event_bus,
            torn_down: false,
        }
    }

    /// Pending transaction session.
    #[must_use]
    pub const fn transactions(&self) -> &SubscriptionSession<PendingTx> {
        &self.transactions
    }

    /// Block session.
    #[must_use]
    pub const fn blocks(&self) -> &SubscriptionSession<BlockEvent> {
        &self.blocks
    }

    /// Wallet gate.
    #[must_use]
    pub const fn wallet(&self) -> &WalletGate {
        &self.wallet
    }

    /// Lifecycle state of `feed`.
    #[must_use]
    pub fn state(&self, feed: FeedKind) -> LifecycleState {
        match feed {
            FeedKind::Transactions => self.transactions.state(),
            FeedKind::Blocks => self.blocks.state(),
        }
    }

    /// Returns `true` once [`Self::teardown`] has run.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Connects the wallet at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidRequest`] for a malformed address.
    pub fn connect_wallet(&mut self, address: &str) -> Result<(), MonitorError> {
        self.wallet.connect(address)?;
        tracing::info!(address = %address.trim(), "wallet connected");
        self.publish_wallet();
        Ok(())
    }

    /// Disconnects the wallet. Running sessions keep running, hidden.
    pub fn disconnect_wallet(&mut self) {
        if self.wallet.is_connected() {
            self.wallet.disconnect();
            tracing::info!("wallet disconnected");
            self.publish_wallet();
        }
    }

    /// Starts `feed`. A no-op if it is already listening.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::WalletNotConnected`] without a wallet,
    /// [`MonitorError::Internal`] after teardown, or the session's connect
    /// or subscribe failure.
    pub async fn start(&mut self, feed: FeedKind) -> Result<LifecycleState, MonitorError> {
        self.ensure_startable()?;
        match feed {
            FeedKind::Transactions => {
                self.transactions
                    .start(self.sources.transactions.as_ref())
                    .await?;
            }
            FeedKind::Blocks => {
                self.blocks.start(self.sources.blocks.as_ref()).await?;
            }
        }
        Ok(self.state(feed))
    }

    /// Stops `feed`. A no-op if it is idle. Always allowed.
    ///
    /// # Errors
    ///
    /// Returns the session's teardown failure; the feed is idle regardless.
    pub fn stop(&mut self, feed: FeedKind) -> Result<LifecycleState, MonitorError> {
        match feed {
            FeedKind::Transactions => self.transactions.stop()?,
            FeedKind::Blocks => self.blocks.stop()?,
        }
        Ok(self.state(feed))
    }

    /// Stops `feed` if listening, starts it otherwise.
    ///
    /// # Errors
    ///
    /// See [`Self::start`] and [`Self::stop`].
    pub async fn toggle(&mut self, feed: FeedKind) -> Result<LifecycleState, MonitorError> {
        match self.state(feed) {
            LifecycleState::Listening => self.stop(feed),
            LifecycleState::Idle => self.start(feed).await,
        }
    }

    /// Builds the view for the current wallet state.
    #[must_use]
    pub fn render(&self) -> DashboardView {
        let Some(address) = self.wallet.address() else {
            return DashboardView::ConnectPrompt {
                message: CONNECT_PROMPT.to_string(),
            };
        };
        DashboardView::Sections {
            wallet_address: address.to_string(),
            transactions: TransactionSection::new(&self.transactions.snapshot(), &self.explorer),
            blocks: BlockSection::new(&self.blocks.snapshot(), &self.explorer),
        }
    }

    /// Stops both sessions, once per dashboard lifetime.
    ///
    /// Both sessions are stopped even if the first one fails.
    ///
    /// # Errors
    ///
    /// Returns the first teardown failure. Later calls return `Ok(())`.
    pub fn teardown(&mut self) -> Result<(), MonitorError> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;
        let transactions = self.transactions.stop();
        let blocks = self.blocks.stop();
        tracing::info!("dashboard torn down");
        transactions.and(blocks)
    }

    fn ensure_startable(&self) -> Result<(), MonitorError> {
        if self.torn_down {
            return Err(MonitorError::Internal("dashboard already torn down".to_string()));
        }
        if !self.wallet.is_connected() {
            return Err(MonitorError::WalletNotConnected);
        }
        Ok(())
    }

    fn publish_wallet(&self) {
        self.event_bus.publish(FeedUpdate::WalletChanged {
            connected: self.wallet.is_connected(),
            timestamp: Utc::now(),
        });
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            tracing::warn!(error = %err, "teardown on drop failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::session::mock::MockSource;
    use tokio_test::{assert_err, assert_ok};

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    struct Harness {
        dashboard: Dashboard,
        txs: MockSource<PendingTx>,
        blocks: MockSource<BlockEvent>,
    }

    fn harness() -> Harness {
        let txs = MockSource::<PendingTx>::new();
        let blocks = MockSource::<BlockEvent>::new();
        let sources = FeedSources {
            transactions: Arc::new(txs.clone()),
            blocks: Arc::new(blocks.clone()),
        };
        let dashboard = Dashboard::new(sources, &MonitorConfig::default(), EventBus::new(64));
        Harness {
            dashboard,
            txs,
            blocks,
        }
    }

    fn connected() -> Harness {
        let mut h = harness();
        assert_ok!(h.dashboard.connect_wallet(ADDR));
        h
    }

    fn block(number: u64, transaction_count: u64) -> BlockEvent {
        let Ok(block) = BlockEvent::from_unix(number, transaction_count, 1_700_000_000) else {
            panic!("valid block");
        };
        block
    }

    #[test]
    fn without_wallet_only_prompt_is_rendered() {
        let h = harness();
        let view = h.dashboard.render();
        assert_eq!(
            view,
            DashboardView::ConnectPrompt {
                message: CONNECT_PROMPT.to_string()
            }
        );
        assert!(!view.shows_sections());
    }

    #[tokio::test]
    async fn start_requires_wallet() {
        let mut h = harness();
        let err = assert_err!(h.dashboard.start(FeedKind::Transactions).await);
        assert_eq!(err, MonitorError::WalletNotConnected);
        assert_eq!(h.txs.connects(), 0);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Blocks).await);
        assert_eq!(h.dashboard.state(FeedKind::Blocks), LifecycleState::Listening);
        assert_eq!(h.dashboard.state(FeedKind::Transactions), LifecycleState::Idle);
        assert_eq!(h.txs.connects(), 0);
        assert_eq!(h.blocks.connects(), 1);
    }

    #[tokio::test]
    async fn render_shows_toggle_count_and_rows() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Blocks).await);
        h.blocks.deliver(vec![block(100, 12)]);
        h.blocks.deliver(vec![block(101, 0)]);

        let DashboardView::Sections {
            wallet_address,
            transactions,
            blocks,
        } = h.dashboard.render()
        else {
            panic!("expected sections");
        };
        assert_eq!(wallet_address, ADDR);

        assert_eq!(transactions.header.toggle.label, "Start Listening");
        assert_eq!(transactions.header.empty_message.as_deref(), Some("Press Start to begin"));
        assert_eq!(transactions.header.event_count, 0);

        assert_eq!(blocks.header.toggle.label, "Stop Listening");
        assert_eq!(blocks.header.toggle.endpoint, "/api/v1/feeds/blocks/stop");
        assert_eq!(blocks.header.event_count, 2);
        assert_eq!(blocks.header.empty_message, None);
        let numbers: Vec<u64> = blocks.rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![101, 100]);
        assert_eq!(
            blocks.rows.first().map(|r| r.url.as_str()),
            Some("https://etherscan.io/block/101")
        );
    }

    #[tokio::test]
    async fn listening_without_items_says_so() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
        let DashboardView::Sections { transactions, .. } = h.dashboard.render() else {
            panic!("expected sections");
        };
        assert_eq!(
            transactions.header.empty_message.as_deref(),
            Some("Listening for pending transactions...")
        );
    }

    #[tokio::test]
    async fn transaction_rows_link_to_explorer() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
        h.txs.deliver(vec![PendingTx::new("0xaa"), PendingTx::new("0xbb")]);
        let DashboardView::Sections { transactions, .. } = h.dashboard.render() else {
            panic!("expected sections");
        };
        let urls: Vec<&str> = transactions.rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://etherscan.io/tx/0xaa", "https://etherscan.io/tx/0xbb"]
        );
    }

    #[tokio::test]
    async fn toggle_cycles_state() {
        let mut h = connected();
        assert_eq!(
            assert_ok!(h.dashboard.toggle(FeedKind::Transactions).await),
            LifecycleState::Listening
        );
        assert_eq!(
            assert_ok!(h.dashboard.toggle(FeedKind::Transactions).await),
            LifecycleState::Idle
        );
        assert_eq!(h.txs.unsubscribes(), 1);
    }

    #[tokio::test]
    async fn node_hangup_lets_toggle_reconnect() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Blocks).await);
        assert!(h.blocks.end(&MonitorError::Connection("node closed the stream".to_string())));
        assert_eq!(h.dashboard.state(FeedKind::Blocks), LifecycleState::Idle);

        assert_eq!(
            assert_ok!(h.dashboard.toggle(FeedKind::Blocks).await),
            LifecycleState::Listening
        );
        assert_eq!(h.blocks.connects(), 2);
        assert_eq!(h.blocks.active(), 1);
        assert_ok!(h.dashboard.teardown());
        assert_eq!(h.blocks.active(), 0);
    }

    #[tokio::test]
    async fn disconnecting_wallet_hides_but_keeps_sessions() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
        h.dashboard.disconnect_wallet();

        assert!(!h.dashboard.render().shows_sections());
        assert_eq!(h.dashboard.state(FeedKind::Transactions), LifecycleState::Listening);
        assert_eq!(h.txs.active(), 1);
        assert_ok!(h.dashboard.stop(FeedKind::Transactions));
    }

    #[tokio::test]
    async fn teardown_releases_only_listening_sessions() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
        assert_ok!(h.dashboard.start(FeedKind::Blocks).await);
        assert_ok!(h.dashboard.stop(FeedKind::Blocks));

        assert_ok!(h.dashboard.teardown());
        assert_eq!(h.txs.unsubscribes(), 1);
        assert_eq!(h.blocks.unsubscribes(), 1);
        assert_eq!(h.txs.active(), 0);
        assert_eq!(h.blocks.active(), 0);
    }

    #[tokio::test]
    async fn teardown_runs_once_even_when_dropped() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
        assert_ok!(h.dashboard.teardown());
        assert_ok!(h.dashboard.teardown());
        assert!(h.dashboard.is_torn_down());

        let Harness { dashboard, txs, .. } = h;
        drop(dashboard);
        assert_eq!(txs.unsubscribes(), 1);
    }

    #[tokio::test]
    async fn drop_tears_down_listening_sessions() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
        assert_ok!(h.dashboard.start(FeedKind::Blocks).await);

        let Harness { dashboard, txs, blocks } = h;
        drop(dashboard);
        assert_eq!(txs.unsubscribes(), 1);
        assert_eq!(blocks.unsubscribes(), 1);
    }

    #[tokio::test]
    async fn teardown_stops_second_session_when_first_fails() {
        let mut h = connected();
        assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
        assert_ok!(h.dashboard.start(FeedKind::Blocks).await);
        h.txs.fail_unsubscribe(true);

        let err = assert_err!(h.dashboard.teardown());
        assert!(matches!(err, MonitorError::Teardown(_)));
        assert_eq!(h.blocks.unsubscribes(), 1);
        assert_eq!(h.dashboard.state(FeedKind::Transactions), LifecycleState::Idle);
    }

    #[tokio::test]
    async fn start_after_teardown_is_refused() {
        let mut h = connected();
        assert_ok!(h.dashboard.teardown());
        assert!(h.dashboard.start(FeedKind::Blocks).await.is_err());
        assert_eq!(h.blocks.connects(), 0);
    }

    #[tokio::test]
    async fn teardown_after_arbitrary_start_stop_sequences() {
        // (ops on transactions, expected cleanup count after teardown)
        let cases: [(&[bool], usize); 4] = [
            (&[], 0),
            (&[true], 1),
            (&[true, false], 1),
            (&[true, false, true, true], 2),
        ];
        for (ops, expected) in cases {
            let mut h = connected();
            for start in ops {
                if *start {
                    assert_ok!(h.dashboard.start(FeedKind::Transactions).await);
                } else {
                    assert_ok!(h.dashboard.stop(FeedKind::Transactions));
                }
            }
            assert_ok!(h.dashboard.teardown());
            assert_eq!(h.txs.unsubscribes(), expected);
            assert_eq!(h.txs.active(), 0);
        }
    }
}
