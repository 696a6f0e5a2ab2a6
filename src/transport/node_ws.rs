//! Ethereum node feeds over an alloy WebSocket provider.
//!
//! Each [`NodeWsSource::connect`] opens its own provider. Subscribing asks
//! the node for the feed's pub/sub topic and then hands the stream to a
//! background task that forwards items into the session's [`FeedSink`]
//! until the [`Subscription`] is cancelled or the node goes away.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use alloy::primitives::B256;
use alloy::providers::{DynProvider, Provider, ProviderBuilder, WsConnect};
use alloy::pubsub::Subscription as NodeSubscription;
use alloy::rpc::types::Header;
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

use crate::domain::{BlockEvent, FeedItem, PendingTx};
use crate::error::MonitorError;
use crate::session::{FeedConnection, FeedSink, FeedSource, Subscription};

/// Default number of reconnect attempts after the node drops the socket.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default pause between reconnect attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(3);

/// A feed item that can be produced from a node pub/sub subscription.
pub trait NodeFeed: FeedItem {
    /// Payload pushed by the node for each notification.
    type Raw: DeserializeOwned + Send + 'static;

    /// Opens the node-side subscription for this feed.
    fn open(
        provider: &DynProvider,
    ) -> BoxFuture<'_, Result<NodeSubscription<Self::Raw>, MonitorError>>;

    /// Turns one notification into a feed item, querying the node if the
    /// payload alone is not enough.
    fn resolve(
        provider: &DynProvider,
        raw: Self::Raw,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<Self, MonitorError>>;
}

impl NodeFeed for PendingTx {
    type Raw = B256;

    fn open(provider: &DynProvider) -> BoxFuture<'_, Result<NodeSubscription<B256>, MonitorError>> {
        Box::pin(async move {
            provider
                .subscribe_pending_transactions()
                .await
                .map_err(|e| MonitorError::Subscription(format!("newPendingTransactions: {e}")))
        })
    }

    fn resolve(
        _provider: &DynProvider,
        raw: B256,
        _timeout: Duration,
    ) -> BoxFuture<'_, Result<Self, MonitorError>> {
        Box::pin(async move { Ok(Self::new(raw.to_string())) })
    }
}

impl NodeFeed for BlockEvent {
    type Raw = Header;

    fn open(
        provider: &DynProvider,
    ) -> BoxFuture<'_, Result<NodeSubscription<Header>, MonitorError>> {
        Box::pin(async move {
            provider
                .subscribe_blocks()
                .await
                .map_err(|e| MonitorError::Subscription(format!("newHeads: {e}")))
        })
    }

    fn resolve(
        provider: &DynProvider,
        raw: Header,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<Self, MonitorError>> {
        Box::pin(async move {
            let count = tokio::time::timeout(
                timeout,
                provider.get_block_transaction_count_by_hash(raw.hash),
            )
            .await
            .map_err(|_| {
                MonitorError::MalformedEvent(format!(
                    "no transaction count for block {}",
                    raw.number
                ))
            })?
            .map_err(|e| {
                MonitorError::MalformedEvent(format!("block {} count: {e}", raw.number))
            })?;
            // A missing count means the node no longer knows the block (reorg).
            Self::from_unix(raw.number, count.unwrap_or(0), raw.timestamp)
        })
    }
}

/// Feed source backed by a node's WebSocket endpoint.
pub struct NodeWsSource<T> {
    endpoint: String,
    request_timeout: Duration,
    max_retries: u32,
    retry_interval: Duration,
    _item: PhantomData<fn() -> T>,
}

impl<T> NodeWsSource<T> {
    /// Creates a source for `endpoint` (a `ws://` or `wss://` URL).
    #[must_use]
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            _item: PhantomData,
        }
    }

    /// Sets how often the provider tries to reconnect after a drop, and how
    /// long it waits between attempts.
    #[must_use]
    pub const fn with_retries(mut self, max_retries: u32, retry_interval: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_interval = retry_interval;
        self
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<T> fmt::Debug for NodeWsSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeWsSource")
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_interval", &self.retry_interval)
            .finish()
    }
}

impl<T: NodeFeed> FeedSource<T> for NodeWsSource<T> {
    fn connect(&self) -> BoxFuture<'_, Result<Box<dyn FeedConnection<T>>, MonitorError>> {
        Box::pin(async move {
            let ws = WsConnect::new(self.endpoint.as_str())
                .with_max_retries(self.max_retries)
                .with_retry_interval(self.retry_interval);
            let handshake = tokio::time::timeout(
                self.request_timeout,
                ProviderBuilder::new()
                    .disable_recommended_fillers()
                    .connect_ws(ws),
            );
            let provider = handshake
                .await
                .map_err(|_| {
                    MonitorError::Connection(format!("timed out connecting to {}", self.endpoint))
                })?
                .map_err(|e| MonitorError::Connection(format!("{}: {e}", self.endpoint)))?
                .erased();
            tracing::debug!(endpoint = %self.endpoint, feed = %T::KIND, "node provider open");
            let connection: Box<dyn FeedConnection<T>> = Box::new(NodeWsConnection::<T> {
                provider,
                request_timeout: self.request_timeout,
                _item: PhantomData,
            });
            Ok(connection)
        })
    }
}

struct NodeWsConnection<T> {
    provider: DynProvider,
    request_timeout: Duration,
    _item: PhantomData<fn() -> T>,
}

impl<T: NodeFeed> FeedConnection<T> for NodeWsConnection<T> {
    fn subscribe(
        self: Box<Self>,
        sink: FeedSink<T>,
    ) -> BoxFuture<'static, Result<Subscription, MonitorError>> {
        let Self {
            provider,
            request_timeout,
            ..
        } = *self;
        Box::pin(async move {
            let node_subscription = tokio::time::timeout(request_timeout, T::open(&provider))
                .await
                .map_err(|_| {
                    MonitorError::Subscription(format!("node did not confirm {} feed", T::KIND))
                })??;
            let local_id = *node_subscription.local_id();

            let (stop_tx, stop_rx) = oneshot::channel();
            tokio::spawn(run_feed(
                provider,
                node_subscription,
                sink,
                stop_rx,
                request_timeout,
            ));

            // A closed receiver means the feed task already ended, which
            // leaves nothing to cancel.
            Ok(Subscription::new(local_id.to_string(), move || {
                let _ = stop_tx.send(());
                Ok(())
            }))
        })
    }
}

/// Forwards notifications into `sink` until stopped or the stream ends.
async fn run_feed<T: NodeFeed>(
    provider: DynProvider,
    node_subscription: NodeSubscription<T::Raw>,
    sink: FeedSink<T>,
    mut stop_rx: oneshot::Receiver<()>,
    request_timeout: Duration,
) {
    let local_id = *node_subscription.local_id();
    let stream = node_subscription.into_stream();
    tokio::pin!(stream);

    let released = loop {
        tokio::select! {
            _ = &mut stop_rx => break true,
            raw = stream.next() => match raw {
                Some(raw) => match T::resolve(&provider, raw, request_timeout).await {
                    Ok(item) => {
                        if !sink.deliver(vec![item]) {
                            break true;
                        }
                    }
                    Err(err) => sink.report(&err),
                },
                None => {
                    sink.end(&MonitorError::Connection("node closed the stream".to_string()));
                    break false;
                }
            },
        }
    };

    if released && let Err(e) = provider.unsubscribe(local_id).await {
        tracing::debug!(feed = %T::KIND, error = %e, "node gone before unsubscribe");
    }
    tracing::debug!(feed = %T::KIND, released, "node feed task finished");
}
