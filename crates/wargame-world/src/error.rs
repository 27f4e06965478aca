//! Error types for the `wargame-world` crate.

use wargame_ledger::LedgerError;
use wargame_types::{Coord, TileId};

/// Errors that can occur during map and catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A tile was not found on the map.
    #[error("tile not found: {0}")]
    TileNotFound(TileId),

    /// No tile occupies the given coordinate.
    #[error("no tile at {0}")]
    NoTileAt(Coord),

    /// A tile with the same identifier already exists.
    #[error("duplicate tile id: {0}")]
    DuplicateTile(TileId),

    /// A tile already occupies the coordinate.
    #[error("coordinate {0} is already occupied")]
    DuplicateCoord(Coord),

    /// A replacement tile tried to move to a different coordinate.
    #[error("tile {tile} cannot move from {from} to {to}")]
    CoordChanged {
        /// The tile being replaced.
        tile: TileId,
        /// Its coordinate on the map.
        from: Coord,
        /// The coordinate on the replacement.
        to: Coord,
    },

    /// A good name was empty or padded with whitespace.
    #[error("invalid good name: {0:?}")]
    InvalidGoodName(String),

    /// The good is not in the catalog.
    #[error("unknown good: {0}")]
    UnknownGood(String),

    /// The requested grid has no cells or does not fit the coordinate range.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,

    /// A goods operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Errors reported by route planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The start or goal cell is not on the map.
    #[error("{0} is not on the map")]
    OffMap(Coord),

    /// Start and goal are the same cell.
    #[error("start and goal are both {0}")]
    SameCell(Coord),

    /// No sequence of tiles connects start to goal.
    #[error("no route from {from} to {to}")]
    Unreachable {
        /// Start cell.
        from: Coord,
        /// Goal cell.
        to: Coord,
    },
}
