//! Axum router construction.
//!
//! Assembles every route (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete router.
///
/// See [`handlers`] and [`operator`] for the endpoint tables. CORS allows
/// any origin so a browser map client can be served from elsewhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/turns", get(ws::ws_turns))
        // Player API
        .route("/api/sessions", post(handlers::open_session))
        .route("/api/me", get(handlers::me))
        .route("/api/tiles", get(handlers::list_tiles))
        .route("/api/tiles/{id}", get(handlers::get_tile))
        .route("/api/tiles/{id}/ownership", get(handlers::tile_ownership))
        .route(
            "/api/actions",
            get(handlers::list_actions).post(handlers::submit_action),
        )
        .route("/api/actions/{id}", delete(handlers::remove_action))
        .route("/api/route", post(handlers::route))
        // Operator API
        .route("/api/operator/resolve", post(operator::resolve))
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/goods", post(operator::add_good))
        .route("/api/operator/goods/{name}", delete(operator::remove_good))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
