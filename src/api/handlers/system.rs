//! System endpoints: health check and the HTML page.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::FeedKind;
use crate::service::page::render_page;
use crate::session::LifecycleState;

/// Health check response.
///
/// Feed states are `null` while a start or stop holds the dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    transactions: Option<LifecycleState>,
    blocks: Option<LifecycleState>,
    ws_clients: usize,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, feed states and the number of live WebSocket clients. Never waits on a feed that is starting.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (transactions, blocks) = match state.dashboard.try_lock() {
        Ok(dashboard) => (
            Some(dashboard.state(FeedKind::Transactions)),
            Some(dashboard.state(FeedKind::Blocks)),
        ),
        Err(_) => (None, None),
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            transactions,
            blocks,
            ws_clients: state.event_bus.receiver_count(),
        }),
    )
}

/// `GET /`: The dashboard page.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Dashboard page",
    responses(
        (status = 200, description = "HTML page", content_type = "text/html", body = String),
    )
)]
pub async fn page_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.dashboard.lock().await.render();
    Html(render_page(&view))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(page_handler))
        .route("/health", get(health_handler))
}
