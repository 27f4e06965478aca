//! `WebSocket` stream of resolution summaries.
//!
//! Clients connect to `GET /ws/turns` and receive one JSON-encoded
//! [`TurnBroadcast`](crate::state::TurnBroadcast) per resolution cycle.
//! A client that falls behind skips the missed turns and resumes from the
//! newest one.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade to a `WebSocket` and start streaming turn summaries.
pub async fn ws_turns(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_turns(socket, state))
}

async fn stream_turns(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("turn stream client connected");
    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(turn) => {
                        let json = match serde_json::to_string(&turn) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!(error = %e, "failed to serialize turn summary");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("turn stream client gone (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "turn stream client lagged");
                    }
                    Err(RecvError::Closed) => return,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => {
                        debug!("turn stream client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    // Clients have nothing to say on this channel.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
