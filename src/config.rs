//! Monitor configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::MonitorError;

/// Default capacity of the pending transaction window.
pub const DEFAULT_TX_WINDOW_CAPACITY: usize = 150;

/// Default capacity of the block window.
pub const DEFAULT_BLOCK_WINDOW_CAPACITY: usize = 100;

/// Default block explorer used for links.
pub const DEFAULT_EXPLORER_URL: &str = "https://etherscan.io";

/// Top-level monitor configuration.
///
/// Loaded once at startup via [`MonitorConfig::from_env`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// WebSocket JSON-RPC endpoint of the Ethereum node.
    pub node_ws_url: String,

    /// Base URL of the block explorer used for transaction and block links.
    pub explorer_url: String,

    /// Number of pending transaction hashes kept on display.
    pub tx_window_capacity: usize,

    /// Number of blocks kept on display.
    pub block_window_capacity: usize,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// How long to wait for the node to answer a request.
    pub node_request_timeout: Duration,

    /// Reconnect attempts after the node drops the socket. Once exhausted
    /// the feed ends and returns to idle.
    pub node_max_retries: u32,

    /// Pause between reconnect attempts.
    pub node_retry_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            node_ws_url: "ws://127.0.0.1:8546".to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            tx_window_capacity: DEFAULT_TX_WINDOW_CAPACITY,
            block_window_capacity: DEFAULT_BLOCK_WINDOW_CAPACITY,
            event_bus_capacity: 1024,
            node_request_timeout: Duration::from_secs(10),
            node_max_retries: 3,
            node_retry_interval: Duration::from_secs(3),
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or cannot be
    /// parsed. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidRequest`] if `LISTEN_ADDR` is set but
    /// cannot be parsed, or if the resulting configuration fails
    /// [`MonitorConfig::validate`].
    pub fn from_env() -> Result<Self, MonitorError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw.parse().map_err(|e| {
                MonitorError::InvalidRequest(format!("LISTEN_ADDR `{raw}`: {e}"))
            })?,
            Err(_) => defaults.listen_addr,
        };

        let node_ws_url = std::env::var("NODE_WS_URL").unwrap_or(defaults.node_ws_url);
        let explorer_url = std::env::var("EXPLORER_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.explorer_url);

        let config = Self {
            listen_addr,
            node_ws_url,
            explorer_url,
            tx_window_capacity: parse_env("TX_WINDOW_CAPACITY", defaults.tx_window_capacity),
            block_window_capacity: parse_env(
                "BLOCK_WINDOW_CAPACITY",
                defaults.block_window_capacity,
            ),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            node_request_timeout: Duration::from_secs(parse_env(
                "NODE_REQUEST_TIMEOUT_SECS",
                defaults.node_request_timeout.as_secs(),
            )),
            node_max_retries: parse_env("NODE_MAX_RETRIES", defaults.node_max_retries),
            node_retry_interval: Duration::from_secs(parse_env(
                "NODE_RETRY_INTERVAL_SECS",
                defaults.node_retry_interval.as_secs(),
            )),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that the parsers alone cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidRequest`] when the node URL is not a
    /// `ws://` or `wss://` URL, or when a capacity is zero.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if !(self.node_ws_url.starts_with("ws://") || self.node_ws_url.starts_with("wss://")) {
            return Err(MonitorError::InvalidRequest(format!(
                "NODE_WS_URL must use ws:// or wss://, got `{}`",
                self.node_ws_url
            )));
        }
        if self.tx_window_capacity == 0 || self.block_window_capacity == 0 {
            return Err(MonitorError::InvalidRequest(
                "window capacities must be positive".to_string(),
            ));
        }
        if self.event_bus_capacity == 0 {
            return Err(MonitorError::InvalidRequest(
                "EVENT_BUS_CAPACITY must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
