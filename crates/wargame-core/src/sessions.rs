//! Open player sessions.
//!
//! A session ties an opaque [`SessionId`] to a player. Sessions carry no
//! credentials; they exist so that an end-turn cycle can log every
//! non-privileged player out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use wargame_types::{PlayerId, SessionId};

use crate::players::PlayerRegistry;

/// One open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// The logged-in player.
    pub player: PlayerId,
    /// When the session was opened.
    pub opened_at: DateTime<Utc>,
}

/// All open sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    sessions: BTreeMap<SessionId, Session>,
}

impl SessionTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
        }
    }

    /// Open a session for `player`.
    pub fn open(&mut self, player: PlayerId) -> Session {
        let session = Session {
            id: SessionId::new(),
            player,
            opened_at: Utc::now(),
        };
        self.sessions.insert(session.id, session);
        session
    }

    /// The player behind a session, if it is open.
    pub fn player_for(&self, id: SessionId) -> Option<PlayerId> {
        self.sessions.get(&id).map(|s| s.player)
    }

    /// Close one session. Returns `true` if it was open.
    pub fn close(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Close every session whose player is not privileged. Sessions of
    /// unknown players are closed too. Returns the number closed.
    pub fn terminate_non_privileged(&mut self, players: &PlayerRegistry) -> u64 {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| players.is_privileged(session.player));
        let closed = before.saturating_sub(self.sessions.len());
        let closed = u64::try_from(closed).unwrap_or(u64::MAX);
        info!(closed, remaining = self.sessions.len(), "non-privileged sessions terminated");
        closed
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
