//! eth-live-monitor server entry point.
//!
//! Starts the Axum HTTP server with the dashboard page, REST and WebSocket
//! endpoints, and tears both node subscriptions down on shutdown.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use eth_live_monitor::api;
use eth_live_monitor::app_state::AppState;
use eth_live_monitor::config::MonitorConfig;
use eth_live_monitor::domain::{BlockEvent, EventBus, PendingTx};
use eth_live_monitor::service::{Dashboard, FeedSources};
use eth_live_monitor::transport::NodeWsSource;
use eth_live_monitor::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = MonitorConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        node = %config.node_ws_url,
        "starting eth-live-monitor"
    );

    // Build domain and transport layers
    let event_bus = EventBus::new(config.event_bus_capacity);
    let sources = FeedSources {
        transactions: Arc::new(NodeWsSource::<PendingTx>::new(
            config.node_ws_url.as_str(),
            config.node_request_timeout,
        )
        .with_retries(config.node_max_retries, config.node_retry_interval)),
        blocks: Arc::new(NodeWsSource::<BlockEvent>::new(
            config.node_ws_url.as_str(),
            config.node_request_timeout,
        )
        .with_retries(config.node_max_retries, config.node_retry_interval)),
    };

    // Build application state
    let dashboard = Dashboard::new(sources, &config, event_bus.clone());
    let app_state = AppState::new(dashboard, event_bus);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down, stopping feeds");
    app_state.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
