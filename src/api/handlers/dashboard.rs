//! Dashboard snapshot handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::service::DashboardView;

/// `GET /dashboard`: Current render model as JSON.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    summary = "Dashboard snapshot",
    description = "Returns the connect prompt while no wallet is connected, otherwise both feed sections with their items newest-first.",
    responses(
        (status = 200, description = "Current dashboard view", body = DashboardView),
    )
)]
pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.dashboard.lock().await.render();
    Json(view)
}

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}
