//! HTTP API for the Wargame turn engine.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Player endpoints** for sessions, the map, routes and intents
//! - **Operator endpoints** for running resolution cycles, reading status
//!   and editing the goods catalog
//! - **`WebSocket` endpoint** (`/ws/turns`) streaming one summary per
//!   resolution cycle via [`tokio::sync::broadcast`]
//! - **HTML status page** (`GET /`)
//!
//! Handlers hold no game state of their own; everything goes through the
//! shared [`Game`](wargame_core::game::Game) handle in [`AppState`].

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{ServerHandle, spawn_server};
pub use state::{AppState, TurnBroadcast};
