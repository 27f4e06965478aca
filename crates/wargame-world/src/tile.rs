//! A single grid cell and its goods.

use serde::{Deserialize, Serialize};

use wargame_ledger::{Stock, TransitLedger};
use wargame_types::{Coord, PlayerId, Terrain, TileId, Waypoint};

/// A tile on the map: terrain, ownership, inventory and in-transit goods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Stable tile identifier.
    pub id: TileId,
    /// Grid position. Unique across the map.
    #[serde(flatten)]
    pub coord: Coord,
    /// Terrain kind.
    pub terrain: Terrain,
    /// Player owning the tile, if any.
    pub owner: Option<PlayerId>,
    /// Inhabitants of the tile.
    pub population: u64,
    /// Goods stored on the tile.
    pub goods: Stock,
    /// Goods passing through the tile, per actor.
    pub moving_goods: TransitLedger,
}

impl Tile {
    /// Create an unowned, empty tile.
    pub fn new(coord: Coord, terrain: Terrain) -> Self {
        Self {
            id: TileId::new(),
            coord,
            terrain,
            owner: None,
            population: 0,
            goods: Stock::new(),
            moving_goods: TransitLedger::new(),
        }
    }

    /// The tile as a route waypoint.
    pub const fn waypoint(&self) -> Waypoint {
        Waypoint::new(self.id, self.coord)
    }

    /// Whether `player` owns this tile.
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_is_unowned_and_empty() {
        let tile = Tile::new(Coord::new(2, 3), Terrain::Forest);
        assert!(tile.owner.is_none());
        assert!(tile.goods.is_empty());
        assert!(tile.moving_goods.is_empty());
        assert_eq!(tile.waypoint().coord(), Coord::new(2, 3));
    }

    #[test]
    fn serializes_coordinates_inline() {
        let tile = Tile::new(Coord::new(2, 3), Terrain::City);
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(json["x"], 2);
        assert_eq!(json["y"], 3);
        assert_eq!(json["terrain"], "city");
    }
}
