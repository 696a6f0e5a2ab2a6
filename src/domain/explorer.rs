//! Block explorer link templates.

use serde::Serialize;

use crate::config::DEFAULT_EXPLORER_URL;

/// Builds explorer URLs for transactions and blocks.
///
/// Links follow the `{base}/tx/{hash}` and `{base}/block/{number}`
/// templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplorerLinks {
    base: String,
}

impl ExplorerLinks {
    /// Creates link templates rooted at `base`. A trailing slash is ignored.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// URL of a transaction page.
    #[must_use]
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{hash}", self.base)
    }

    /// URL of a block page.
    #[must_use]
    pub fn block_url(&self, number: u64) -> String {
        format!("{}/block/{number}", self.base)
    }
}

impl Default for ExplorerLinks {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLORER_URL)
    }
}
