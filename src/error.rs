//! Monitor error types with HTTP status code mapping.
//!
//! [`MonitorError`] is the central error type for the service. Session and
//! transport failures use the same enum as request validation so that a
//! failed `start` can be returned straight from a handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "connection error: node refused the handshake",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Service-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | State           | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Node transport  | 502 Bad Gateway / 500      |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested feed name does not exist.
    #[error("unknown feed: {0}")]
    UnknownFeed(String),

    /// A feed cannot be started while no wallet is connected.
    #[error("wallet not connected")]
    WalletNotConnected,

    /// Establishing the streaming connection to the node failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The node rejected or never answered the subscription request.
    #[error("subscription error: {0}")]
    Subscription(String),

    /// A delivered event could not be decoded and was dropped.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Releasing a subscription failed. The session is idle regardless.
    #[error("teardown error: {0}")]
    Teardown(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::UnknownFeed(_) => 2001,
            Self::WalletNotConnected => 2002,
            Self::Connection(_) => 3001,
            Self::Subscription(_) => 3002,
            Self::MalformedEvent(_) => 3003,
            Self::Teardown(_) => 3004,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnknownFeed(_) => StatusCode::NOT_FOUND,
            Self::WalletNotConnected => StatusCode::CONFLICT,
            Self::Connection(_) | Self::Subscription(_) | Self::MalformedEvent(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Teardown(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_maps_to_bad_gateway() {
        let err = MonitorError::Connection("refused".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), 3001);
        assert_eq!(err.to_string(), "connection error: refused");
    }

    #[test]
    fn wallet_gate_is_a_conflict() {
        let response = MonitorError::WalletNotConnected.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
