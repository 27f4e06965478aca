//! Player-facing REST handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Session | Description |
//! |--------|------|---------|-------------|
//! | `GET` | `/` | no | HTML status page |
//! | `POST` | `/api/sessions` | no | Open a session for a display name |
//! | `GET` | `/api/me` | yes | Caller's balance, colour and holdings |
//! | `GET` | `/api/tiles` | no | Every tile |
//! | `GET` | `/api/tiles/{id}` | no | One tile |
//! | `GET` | `/api/tiles/{id}/ownership` | yes | Whether the caller owns a tile |
//! | `POST` | `/api/actions` | yes | Submit an intent |
//! | `GET` | `/api/actions` | yes | Caller's queued, progressing and settled actions |
//! | `DELETE` | `/api/actions/{id}` | yes | Withdraw a queued intent |
//! | `POST` | `/api/route` | no | Plan a route between two tiles |
//!
//! The session travels in the [`SESSION_HEADER`] request header.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use serde::Deserialize;

use wargame_types::{ActionId, IntentRequest, PlayerId, SessionId, TileId};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Request header carrying the session id.
pub const SESSION_HEADER: &str = "x-session-id";

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/sessions`.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    /// Display name to log in as. Unknown names are registered.
    pub display_name: String,
}

/// Body of `POST /api/route`.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// Start tile.
    pub from: TileId,
    /// Goal tile.
    pub to: TileId,
    /// Per-turn movement budget; the configured one when absent.
    #[serde(default)]
    pub budget: Option<u32>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the caller from the session header.
pub(crate) async fn session_player(state: &AppState, headers: &HeaderMap) -> Result<PlayerId, ApiError> {
    let raw = headers
        .get(SESSION_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {SESSION_HEADER} header")))?
        .to_str()
        .map_err(|e| ApiError::Unauthorized(format!("unreadable {SESSION_HEADER}: {e}")))?;
    let session: SessionId = raw
        .parse()
        .map_err(|e| ApiError::Unauthorized(format!("invalid session id {raw}: {e}")))?;
    Ok(state.game.authenticate(session).await?)
}

fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: core::str::FromStr<Err = uuid::Error>,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid id {raw}: {e}")))
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Minimal HTML page with the game date and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.game.status().await;
    let game = &status.game;
    let date = status.current_date;
    let cycles = status.cycles_run;
    let players = status.players;
    let sessions = status.open_sessions;
    let cycle = if status.cycle_in_flight {
        "RESOLVING"
    } else {
        "WAITING FOR ORDERS"
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{game}</title>
    <style>
        body {{
            background: #1b1712;
            color: #e6dcc8;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #d9a441; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            border: 1px solid #4a3f2e;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #a3967e; font-size: 0.85rem; }}
        .metric .value {{ color: #d9a441; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #d9a441; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>{game}</h1>
    <p>Status: <strong>{cycle}</strong></p>

    <div>
        <div class="metric"><div class="label">Date</div><div class="value">{date}</div></div>
        <div class="metric"><div class="label">Turns</div><div class="value">{cycles}</div></div>
        <div class="metric"><div class="label">Players</div><div class="value">{players}</div></div>
        <div class="metric"><div class="label">Sessions</div><div class="value">{sessions}</div></div>
    </div>

    <h2>API</h2>
    <ul>
        <li>POST /api/sessions</li>
        <li>GET <a href="/api/tiles">/api/tiles</a></li>
        <li>GET /api/me, GET|POST /api/actions, DELETE /api/actions/{{id}}</li>
        <li>POST /api/route</li>
        <li>GET <a href="/api/operator/status">/api/operator/status</a></li>
        <li>WebSocket <code>/ws/turns</code></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Sessions and the caller
// ---------------------------------------------------------------------------

/// Open a session, registering the display name if it is new.
pub async fn open_session(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<OpenSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.game.open_session(&body.display_name).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "session_id": session.id,
            "player_id": session.player,
            "display_name": body.display_name,
        })),
    ))
}

/// The caller's overview.
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let player = session_player(&state, &headers).await?;
    Ok(Json(state.game.overview(player).await?))
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// Every tile, row by row.
pub async fn list_tiles(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tiles = state.game.tiles().await;
    Json(serde_json::json!({
        "count": tiles.len(),
        "tiles": tiles,
    }))
}

/// One tile.
pub async fn get_tile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TileId = parse_id(&id)?;
    Ok(Json(state.game.tile(id).await?))
}

/// Whether the caller owns a tile.
pub async fn tile_ownership(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let player = session_player(&state, &headers).await?;
    let id: TileId = parse_id(&id)?;
    Ok(Json(state.game.ownership(player, id).await?))
}

/// Plan a route.
pub async fn route(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RouteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.game.route(body.from, body.to, body.budget).await?))
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Queue an intent for the next cycle.
pub async fn submit_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<IntentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let player = session_player(&state, &headers).await?;
    let action_id = state.game.submit(player, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "action_id": action_id })),
    ))
}

/// The caller's actions in every stage.
pub async fn list_actions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let player = session_player(&state, &headers).await?;
    Ok(Json(state.game.list(player).await))
}

/// Withdraw one of the caller's queued intents.
pub async fn remove_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let player = session_player(&state, &headers).await?;
    let id: ActionId = parse_id(&id)?;
    state.game.remove(player, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
