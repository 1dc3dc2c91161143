//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/updates` -- `WebSocket` cycle update stream
/// - `GET /api/catalog` -- zone, species, and variable catalogs
/// - `GET /api/zones` -- zone list
/// - `GET|PUT /api/zones/selected` -- zone selection
/// - `GET /api/zones/{id}/observations|latest|indices|composition|environment`
/// - `POST /api/operator/pause|resume|speed|stop`, `GET /api/operator/status`
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/updates", get(ws::ws_updates))
        // REST API
        .route("/api/catalog", get(handlers::get_catalog))
        .route("/api/zones", get(handlers::list_zones))
        .route(
            "/api/zones/selected",
            get(handlers::get_selected_zone).put(handlers::set_selected_zone),
        )
        .route("/api/zones/{id}/observations", get(handlers::get_observations))
        .route("/api/zones/{id}/latest", get(handlers::get_latest))
        .route("/api/zones/{id}/indices", get(handlers::get_indices))
        .route("/api/zones/{id}/composition", get(handlers::get_composition))
        .route("/api/zones/{id}/environment", get(handlers::get_environment))
        // Operator API
        .route("/api/operator/pause", post(operator::pause))
        .route("/api/operator/resume", post(operator::resume))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
