//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; the page and the health
//! check live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "eth-live-monitor",
        description = "Wallet-gated live dashboard for Ethereum pending transactions and new blocks."
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::page_handler,
        handlers::dashboard::get_dashboard,
        handlers::feeds::start_feed,
        handlers::feeds::stop_feed,
        handlers::feeds::toggle_feed,
        handlers::wallet::connect_wallet,
        handlers::wallet::disconnect_wallet,
    ),
    tags(
        (name = "System", description = "Health and page"),
        (name = "Dashboard", description = "Dashboard snapshot"),
        (name = "Feeds", description = "Start and stop the live feeds"),
        (name = "Wallet", description = "Wallet gate"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
