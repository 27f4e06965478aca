//! The tile grid for the Wargame turn engine.
//!
//! This crate models the physical map: tiles with terrain, ownership and
//! goods, the terrain traversal costs, the grid pathfinder that plans
//! multi-turn shipment routes, and the goods catalog.
//!
//! # Modules
//!
//! - [`catalog`] -- [`GoodsCatalog`], the global set of good names.
//! - [`error`] -- Error types for map operations and route planning.
//! - [`pathfinding`] -- A* over the 8-neighbourhood with turn partitioning.
//! - [`starting_world`] -- Seeded generation of the starting map.
//! - [`terrain`] -- Traversal costs and the [`TerrainMap`] view.
//! - [`tile`] -- The [`Tile`] struct.
//! - [`world_map`] -- [`WorldMap`]: tiles indexed by id and coordinate,
//!   ownership queries and catalog reconciliation.

pub mod catalog;
pub mod error;
pub mod pathfinding;
pub mod starting_world;
pub mod terrain;
pub mod tile;
pub mod world_map;

// Re-export primary types at crate root.
pub use catalog::GoodsCatalog;
pub use error::{PathError, WorldError};
pub use pathfinding::{Route, find_path, plan_route};
pub use starting_world::{WorldParams, claim_starting_tiles, create_starting_world};
pub use terrain::{TerrainMap, traversal_cost};
pub use tile::Tile;
pub use world_map::{ReconcileReport, WorldMap};
