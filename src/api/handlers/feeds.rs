//! Feed control handlers: start, stop, toggle.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::FeedStateResponse;
use crate::app_state::AppState;
use crate::domain::FeedKind;
use crate::error::{ErrorResponse, MonitorError};
use crate::service::Dashboard;
use crate::session::LifecycleState;

fn feed_state(dashboard: &Dashboard, feed: FeedKind, state: LifecycleState) -> FeedStateResponse {
    let event_count = match feed {
        FeedKind::Transactions => dashboard.transactions().event_count(),
        FeedKind::Blocks => dashboard.blocks().event_count(),
    };
    FeedStateResponse {
        feed,
        state,
        event_count,
        timestamp: Utc::now(),
    }
}

/// `POST /feeds/{feed}/start`: Start listening.
///
/// # Errors
///
/// Returns [`MonitorError`] if the feed is unknown, no wallet is connected,
/// or the node refuses the subscription.
#[utoipa::path(
    post,
    path = "/api/v1/feeds/{feed}/start",
    tag = "Feeds",
    summary = "Start a feed",
    description = "Opens a node subscription for the feed. Starting a feed that is already listening is a no-op.",
    params(("feed" = FeedKind, Path, description = "`transactions` or `blocks`")),
    responses(
        (status = 200, description = "Feed is listening", body = FeedStateResponse),
        (status = 404, description = "Unknown feed", body = ErrorResponse),
        (status = 409, description = "No wallet connected", body = ErrorResponse),
        (status = 502, description = "Node connection or subscription failed", body = ErrorResponse),
    )
)]
pub async fn start_feed(
    State(state): State<AppState>,
    Path(feed): Path<String>,
) -> Result<impl IntoResponse, MonitorError> {
    let feed: FeedKind = feed.parse()?;
    let mut dashboard = state.dashboard.lock().await;
    let lifecycle = dashboard.start(feed).await?;
    Ok(Json(feed_state(&dashboard, feed, lifecycle)))
}

/// `POST /feeds/{feed}/stop`: Stop listening.
///
/// # Errors
///
/// Returns [`MonitorError`] if the feed is unknown or cancelling the node
/// subscription fails.
#[utoipa::path(
    post,
    path = "/api/v1/feeds/{feed}/stop",
    tag = "Feeds",
    summary = "Stop a feed",
    description = "Cancels the node subscription. Collected items are kept.",
    params(("feed" = FeedKind, Path, description = "`transactions` or `blocks`")),
    responses(
        (status = 200, description = "Feed is idle", body = FeedStateResponse),
        (status = 404, description = "Unknown feed", body = ErrorResponse),
        (status = 500, description = "Cancelling the subscription failed", body = ErrorResponse),
    )
)]
pub async fn stop_feed(
    State(state): State<AppState>,
    Path(feed): Path<String>,
) -> Result<impl IntoResponse, MonitorError> {
    let feed: FeedKind = feed.parse()?;
    let mut dashboard = state.dashboard.lock().await;
    let lifecycle = dashboard.stop(feed)?;
    Ok(Json(feed_state(&dashboard, feed, lifecycle)))
}

/// `POST /feeds/{feed}/toggle`: Start when idle, stop when listening.
///
/// # Errors
///
/// Returns [`MonitorError`] under the same conditions as start and stop.
#[utoipa::path(
    post,
    path = "/api/v1/feeds/{feed}/toggle",
    tag = "Feeds",
    summary = "Toggle a feed",
    description = "The single control shown in each dashboard section.",
    params(("feed" = FeedKind, Path, description = "`transactions` or `blocks`")),
    responses(
        (status = 200, description = "New feed state", body = FeedStateResponse),
        (status = 404, description = "Unknown feed", body = ErrorResponse),
        (status = 409, description = "No wallet connected", body = ErrorResponse),
        (status = 502, description = "Node connection or subscription failed", body = ErrorResponse),
    )
)]
pub async fn toggle_feed(
    State(state): State<AppState>,
    Path(feed): Path<String>,
) -> Result<impl IntoResponse, MonitorError> {
    let feed: FeedKind = feed.parse()?;
    let mut dashboard = state.dashboard.lock().await;
    let lifecycle = dashboard.toggle(feed).await?;
    Ok(Json(feed_state(&dashboard, feed, lifecycle)))
}

/// Feed routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feeds/{feed}/start", post(start_feed))
        .route("/feeds/{feed}/stop", post(stop_feed))
        .route("/feeds/{feed}/toggle", post(toggle_feed))
}
