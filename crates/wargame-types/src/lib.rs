//! Shared type definitions for the Wargame turn engine.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: identifiers, terrain and action enums, grid coordinates and
//! the three-stage action records. Types flow downstream to `TypeScript`
//! via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for players, tiles, actions, sessions
//! - [`enums`] -- Terrain, action kinds and failure reasons
//! - [`structs`] -- Grid coordinates, route waypoints and players
//! - [`actions`] -- Intent requests, payloads and the action lifecycle

pub mod actions;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{
    ActionPayload, ActionRecord, ActionStage, IntentRequest, MoveGoods, MoveGoodsRequest, Outcome,
    ProgressingAction, QueuedAction, SettledAction,
};
pub use enums::{ActionKind, FailureReason, Terrain, UnknownTerrain};
pub use ids::{ActionId, PlayerId, SessionId, TileId};
pub use structs::{Coord, Player, Waypoint};
