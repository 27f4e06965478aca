//! Operator REST handlers.
//!
//! Every endpoint here except `status` requires a session belonging to a
//! privileged player.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/resolve` | Run one resolution cycle |
//! | `GET` | `/api/operator/status` | Cycle counters and current date |
//! | `POST` | `/api/operator/goods` | Add a good and reconcile every tile |
//! | `DELETE` | `/api/operator/goods/{name}` | Remove a good and reconcile every tile |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiJson};
use crate::handlers::session_player;
use crate::state::{AppState, TurnBroadcast};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/operator/resolve`.
#[derive(Debug, Default, Deserialize)]
pub struct ResolveRequest {
    /// Close every non-privileged session after the cycle.
    #[serde(default)]
    pub end_turn: bool,
}

/// Body of `POST /api/operator/goods`.
#[derive(Debug, Deserialize)]
pub struct AddGoodRequest {
    /// Name of the good.
    pub name: String,
}

// ---------------------------------------------------------------------------
// POST /api/operator/resolve
// ---------------------------------------------------------------------------

/// Run a resolution cycle and broadcast its summary.
///
/// Returns 409 if a cycle is already running. Running it twice advances
/// the calendar twice.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<ResolveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let operator = session_player(&state, &headers).await?;
    let summary = state.game.resolve(operator, body.end_turn).await?;
    let reached = state.broadcast(&TurnBroadcast::from(&summary));
    debug!(subscribers = reached, "turn summary broadcast");
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Current operator status.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.game.status().await)
}

// ---------------------------------------------------------------------------
// Goods catalog
// ---------------------------------------------------------------------------

/// Add a good to the catalog.
pub async fn add_good(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<AddGoodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let operator = session_player(&state, &headers).await?;
    Ok(Json(state.game.add_good(operator, &body.name).await?))
}

/// Remove a good from the catalog. Units on tiles are discarded.
pub async fn remove_good(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let operator = session_player(&state, &headers).await?;
    Ok(Json(state.game.remove_good(operator, &name).await?))
}
