//! Wallet gate handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ConnectWalletRequest, WalletStatusResponse};
use crate::app_state::AppState;
use crate::domain::WalletGate;
use crate::error::{ErrorResponse, MonitorError};

fn wallet_status(wallet: &WalletGate) -> WalletStatusResponse {
    WalletStatusResponse {
        connected: wallet.is_connected(),
        address: wallet.address().map(str::to_string),
    }
}

/// `POST /wallet`: Connect a wallet.
///
/// # Errors
///
/// Returns [`MonitorError::InvalidRequest`] for a malformed address.
#[utoipa::path(
    post,
    path = "/api/v1/wallet",
    tag = "Wallet",
    summary = "Connect wallet",
    description = "Opens the wallet gate so the feed sections are shown. Replaces any connected address.",
    request_body = ConnectWalletRequest,
    responses(
        (status = 200, description = "Wallet connected", body = WalletStatusResponse),
        (status = 400, description = "Malformed address", body = ErrorResponse),
    )
)]
pub async fn connect_wallet(
    State(state): State<AppState>,
    Json(req): Json<ConnectWalletRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.connect_wallet(&req.address)?;
    Ok(Json(wallet_status(dashboard.wallet())))
}

/// `DELETE /wallet`: Disconnect the wallet.
///
/// Running feeds keep running; only the sections are hidden.
#[utoipa::path(
    delete,
    path = "/api/v1/wallet",
    tag = "Wallet",
    summary = "Disconnect wallet",
    description = "Closes the wallet gate. Feed sessions are not stopped.",
    responses(
        (status = 200, description = "Wallet disconnected", body = WalletStatusResponse),
    )
)]
pub async fn disconnect_wallet(State(state): State<AppState>) -> impl IntoResponse {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.disconnect_wallet();
    Json(wallet_status(dashboard.wallet()))
}

/// Wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/wallet", post(connect_wallet).delete(disconnect_wallet))
}
