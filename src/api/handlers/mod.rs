//! REST endpoint handlers organized by resource.

pub mod dashboard;
pub mod feeds;
pub mod system;
pub mod wallet;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::routes())
        .merge(feeds::routes())
        .merge(wallet::routes())
}
