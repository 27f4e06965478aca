//! Shared application state for the API server.
//!
//! [`AppState`] holds the [`Game`] handle every handler talks to and the
//! broadcast channel that carries resolution summaries to `WebSocket`
//! subscribers.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::broadcast;

use wargame_core::game::Game;
use wargame_core::resolution::ResolutionSummary;

/// Capacity of the broadcast channel for turn summaries.
///
/// A subscriber that falls further behind than this receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest message.
const BROADCAST_CAPACITY: usize = 64;

/// JSON message pushed over `/ws/turns` after each resolution cycle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TurnBroadcast {
    /// Date the cycle resolved on.
    pub resolved_on: NaiveDate,
    /// Calendar date after the cycle.
    pub date: NaiveDate,
    /// Whether the cycle ended the turn.
    pub end_turn: bool,
    /// Queued actions accepted.
    pub accepted: u64,
    /// Queued actions rejected.
    pub rejected: u64,
    /// Shipments moved one hop.
    pub advanced: u64,
    /// Shipments delivered.
    pub succeeded: u64,
    /// Shipments lost in transit.
    pub failed: u64,
    /// Sessions closed by the cycle.
    pub sessions_terminated: u64,
}

impl From<&ResolutionSummary> for TurnBroadcast {
    fn from(summary: &ResolutionSummary) -> Self {
        Self {
            resolved_on: summary.resolved_on,
            date: summary.new_date,
            end_turn: summary.end_turn,
            accepted: summary.accepted,
            rejected: summary.rejected,
            advanced: summary.advanced,
            succeeded: summary.succeeded,
            failed: summary.failed,
            sessions_terminated: summary.sessions_terminated,
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The running game.
    pub game: Arc<Game>,
    /// Broadcast sender for turn summaries.
    pub tx: broadcast::Sender<TurnBroadcast>,
}

impl AppState {
    /// Wrap a game handle.
    pub fn new(game: Arc<Game>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { game, tx }
    }

    /// Subscribe to turn summaries.
    pub fn subscribe(&self) -> broadcast::Receiver<TurnBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a turn summary. Returns the number of subscribers reached,
    /// which is zero when nobody is listening.
    pub fn broadcast(&self, summary: &TurnBroadcast) -> usize {
        self.tx.send(summary.clone()).unwrap_or(0)
    }
}
