//! Wallet gate requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `POST /api/v1/wallet` body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConnectWalletRequest {
    /// Hex-encoded wallet address (`0x` + 40 hex digits).
    pub address: String,
}

/// Wallet gate status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletStatusResponse {
    /// Whether a wallet is connected.
    pub connected: bool,
    /// Connected address, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}
