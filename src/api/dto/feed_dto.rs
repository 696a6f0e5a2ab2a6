//! Feed control responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::FeedKind;
use crate::session::LifecycleState;

/// Result of a start, stop or toggle request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedStateResponse {
    /// Affected feed.
    pub feed: FeedKind,
    /// State after the request.
    pub state: LifecycleState,
    /// Items received by the feed so far.
    pub event_count: u64,
    /// Time of the response.
    pub timestamp: DateTime<Utc>,
}
