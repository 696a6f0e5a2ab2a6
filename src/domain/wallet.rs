//! Wallet gate: whether a wallet is connected, and which one.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::MonitorError;

/// Connection signal coming from the wallet side.
///
/// The address is opaque to the dashboard; only the connected flag gates
/// what is shown and what may be started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct WalletGate {
    address: Option<String>,
}

impl WalletGate {
    /// Creates a gate with no wallet connected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `address` as connected, replacing any previous wallet.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidRequest`] unless `address` is `0x`
    /// followed by 40 hex digits.
    pub fn connect(&mut self, address: &str) -> Result<(), MonitorError> {
        let address = address.trim();
        let hex = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .ok_or_else(|| MonitorError::InvalidRequest("address must start with 0x".to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MonitorError::InvalidRequest(format!(
                "`{address}` is not a 20-byte hex address"
            )));
        }
        self.address = Some(address.to_string());
        Ok(())
    }

    /// Forgets the connected wallet.
    pub fn disconnect(&mut self) {
        self.address = None;
    }

    /// Returns `true` if a wallet is connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Address of the connected wallet.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    #[test]
    fn starts_disconnected() {
        let gate = WalletGate::new();
        assert!(!gate.is_connected());
        assert_eq!(gate.address(), None);
    }

    #[test]
    fn connect_and_disconnect() {
        let mut gate = WalletGate::new();
        assert!(gate.connect(ADDR).is_ok());
        assert!(gate.is_connected());
        assert_eq!(gate.address(), Some(ADDR));

        gate.disconnect();
        assert!(!gate.is_connected());
    }

    #[test]
    fn rejects_malformed_addresses() {
        let mut gate = WalletGate::new();
        assert!(gate.connect("742d35Cc6634C0532925a3b844Bc454e4438f44e").is_err());
        assert!(gate.connect("0x1234").is_err());
        assert!(gate.connect("0xZZ2d35Cc6634C0532925a3b844Bc454e4438f44e").is_err());
        assert!(!gate.is_connected());
    }
}
