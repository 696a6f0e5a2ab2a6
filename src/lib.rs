//! # eth-live-monitor
//!
//! Wallet-gated live dashboard for the Ethereum network.
//!
//! Once a wallet is connected the dashboard shows two independently
//! controlled feeds: pending transaction hashes and newly mined blocks.
//! Each feed is a subscription session over the node's `eth_subscribe`
//! WebSocket API, keeps a running count and a bounded newest-first window,
//! and pushes every change to WebSocket clients.
//!
//! ## Architecture
//!
//! ```text
//! Browser (HTML page, REST, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── Dashboard + render model (service/)
//!     ├── SubscriptionSession ×2 (session/)
//!     ├── EventWindow, WalletGate, EventBus (domain/)
//!     │
//!     └── Node JSON-RPC over WebSocket (transport/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod session;
pub mod transport;
pub mod ws;
