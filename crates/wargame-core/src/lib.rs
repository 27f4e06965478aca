//! Turn engine for the Wargame simulation.
//!
//! This crate owns the operator-triggered resolution cycle that drains
//! queued player intents, moves accepted shipments one hop per turn and
//! advances the in-game calendar.
//!
//! # Modules
//!
//! - [`calendar`] -- The single in-game date, advanced once per cycle.
//! - [`config`] -- Configuration loading from `wargame-config.yaml` into
//!   strongly-typed structs.
//! - [`game`] -- [`Game`], the async facade with cycle mutual exclusion.
//! - [`intents`] -- Submit, remove and list player intents.
//! - [`operator`] -- Cycle counters for the operator status endpoint.
//! - [`players`] -- The player registry.
//! - [`queries`] -- Overview, ownership and route queries.
//! - [`resolution`] -- The resolution cycle itself.
//! - [`sessions`] -- Open player sessions.
//! - [`state`] -- [`GameState`], everything a cycle reads and writes.
//! - [`store`] -- [`ActionStore`] trait and [`MemoryActionStore`].
//!
//! [`Game`]: game::Game
//! [`GameState`]: state::GameState
//! [`ActionStore`]: store::ActionStore
//! [`MemoryActionStore`]: store::MemoryActionStore

pub mod calendar;
pub mod config;
pub mod game;
pub mod intents;
pub mod operator;
pub mod players;
pub mod queries;
pub mod resolution;
pub mod sessions;
pub mod state;
pub mod store;
