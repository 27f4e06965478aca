//! Operator-facing cycle bookkeeping.
//!
//! [`OperatorState`] is shared between the [`Game`](crate::game::Game)
//! facade and the HTTP handlers. Counters are atomics so status reads never
//! wait on a running cycle; only the last-cycle timestamp sits behind a
//! lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

/// Point-in-time operator status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorStatus {
    /// Game name from configuration.
    pub game: String,
    /// Cycles completed since start.
    pub cycles_run: u64,
    /// Current in-game date.
    pub current_date: NaiveDate,
    /// Whether a cycle is running right now.
    pub cycle_in_flight: bool,
    /// When the last cycle finished.
    pub last_cycle_at: Option<DateTime<Utc>>,
    /// When the process started.
    pub started_at: DateTime<Utc>,
    /// Open sessions.
    pub open_sessions: u64,
    /// Registered players.
    pub players: u64,
}

/// Shared cycle counters.
#[derive(Debug)]
pub struct OperatorState {
    cycles_run: AtomicU64,
    in_flight: AtomicBool,
    started_at: DateTime<Utc>,
    last_cycle_at: Mutex<Option<DateTime<Utc>>>,
}

impl Default for OperatorState {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorState {
    /// Fresh counters stamped with the current time.
    pub fn new() -> Self {
        Self {
            cycles_run: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            started_at: Utc::now(),
            last_cycle_at: Mutex::new(None),
        }
    }

    /// Mark a cycle as started.
    pub fn begin_cycle(&self) {
        self.in_flight.store(true, Ordering::Release);
    }

    /// Mark a cycle as finished. `completed` is false when it aborted
    /// before touching state.
    pub async fn end_cycle(&self, completed: bool) {
        if completed {
            self.cycles_run.fetch_add(1, Ordering::AcqRel);
            *self.last_cycle_at.lock().await = Some(Utc::now());
        }
        self.in_flight.store(false, Ordering::Release);
    }

    /// Cycles completed since start.
    pub fn cycles_run(&self) -> u64 {
        self.cycles_run.load(Ordering::Acquire)
    }

    /// Whether a cycle is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Process start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the last cycle finished, if any has.
    pub async fn last_cycle_at(&self) -> Option<DateTime<Utc>> {
        *self.last_cycle_at.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_cycle_is_counted() {
        let state = OperatorState::new();
        assert_eq!(state.cycles_run(), 0);
        assert!(state.last_cycle_at().await.is_none());

        state.begin_cycle();
        assert!(state.is_in_flight());
        state.end_cycle(true).await;

        assert!(!state.is_in_flight());
        assert_eq!(state.cycles_run(), 1);
        assert!(state.last_cycle_at().await.is_some());
    }

    #[tokio::test]
    async fn aborted_cycle_is_not_counted() {
        let state = OperatorState::new();
        state.begin_cycle();
        state.end_cycle(false).await;
        assert!(!state.is_in_flight());
        assert_eq!(state.cycles_run(), 0);
    }
}
