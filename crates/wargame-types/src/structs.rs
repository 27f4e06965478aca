//! Core entity structs: grid coordinates, route waypoints and players.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{PlayerId, TileId};

// ---------------------------------------------------------------------------
// Grid coordinates
// ---------------------------------------------------------------------------

/// The eight compass offsets of the Moore neighbourhood.
///
/// Orthogonal offsets come first, then diagonals. The pathfinder expands
/// neighbours in exactly this order.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// A cell position on the 2D tile grid. `(x, y)` is the unique key of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: diagonal steps count the same as orthogonal ones.
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Whether `other` is one of the eight cells touching this one.
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.chebyshev(other) == 1
    }

    /// The eight surrounding cells. Offsets that would overflow `i32` are
    /// skipped.
    pub fn neighbours(self) -> impl Iterator<Item = Self> {
        NEIGHBOUR_OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            Some(Self {
                x: self.x.checked_add(dx)?,
                y: self.y.checked_add(dy)?,
            })
        })
    }
}

impl core::fmt::Display for Coord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Waypoints
// ---------------------------------------------------------------------------

/// A tile marking a turn boundary along a computed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Waypoint {
    /// The tile at this hop.
    pub tile_id: TileId,
    /// Column of the tile.
    pub x: i32,
    /// Row of the tile.
    pub y: i32,
}

impl Waypoint {
    /// Build a waypoint for the tile at `coord`.
    pub const fn new(tile_id: TileId, coord: Coord) -> Self {
        Self {
            tile_id,
            x: coord.x,
            y: coord.y,
        }
    }

    /// The grid position of this waypoint.
    pub const fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A player account: the actor behind submitted intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Stable player identifier.
    pub id: PlayerId,
    /// Name shown on the map and in action listings.
    pub display_name: String,
    /// Current money balance. Never negative.
    pub money: u64,
    /// Map colour as `#rrggbb`.
    pub color: String,
    /// Operators may run resolution cycles and keep their sessions across
    /// end-turn cycles.
    pub privileged: bool,
}
