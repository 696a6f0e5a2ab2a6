//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::EventBus;
use crate::service::Dashboard;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The dashboard. Every control operation goes through this lock, so
    /// start/stop calls on the same feed never interleave.
    pub dashboard: Arc<Mutex<Dashboard>>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps `dashboard` for sharing between handlers.
    #[must_use]
    pub fn new(dashboard: Dashboard, event_bus: EventBus) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            event_bus,
        }
    }

    /// Stops both feeds on the way out. A teardown failure is logged, not
    /// returned, so a clean server exit stays clean.
    ///
    /// Returns `true` if every subscription was released.
    pub async fn shutdown(&self) -> bool {
        match self.dashboard.lock().await.teardown() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "feed teardown failed during shutdown");
                false
            }
        }
    }
}
