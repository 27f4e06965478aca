//! The tile grid.
//!
//! The [`WorldMap`] stores every [`Tile`] by identifier and keeps a
//! coordinate index so that `(x, y)` stays a unique key. It hands out a
//! [`TerrainMap`] snapshot for route planning and runs the goods catalog
//! reconciliation pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wargame_types::{Coord, PlayerId, TileId};

use crate::catalog::GoodsCatalog;
use crate::error::WorldError;
use crate::terrain::TerrainMap;
use crate::tile::Tile;

/// Counts produced by [`WorldMap::reconcile_goods`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Zero entries inserted for newly listed goods.
    pub entries_added: u64,
    /// Entries dropped for goods no longer listed.
    pub entries_removed: u64,
    /// Units held in dropped entries.
    pub units_discarded: u64,
}

/// All tiles on the map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldMap {
    /// Tiles indexed by identifier.
    tiles: BTreeMap<TileId, Tile>,
    /// Coordinate index.
    by_coord: BTreeMap<Coord, TileId>,
}

impl WorldMap {
    /// Create an empty map.
    pub const fn new() -> Self {
        Self {
            tiles: BTreeMap::new(),
            by_coord: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Tile operations
    // -------------------------------------------------------------------

    /// Add a tile.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateTile`] or [`WorldError::DuplicateCoord`]
    /// if the identifier or coordinate is already taken.
    pub fn add_tile(&mut self, tile: Tile) -> Result<(), WorldError> {
        if self.tiles.contains_key(&tile.id) {
            return Err(WorldError::DuplicateTile(tile.id));
        }
        if self.by_coord.contains_key(&tile.coord) {
            return Err(WorldError::DuplicateCoord(tile.coord));
        }
        self.by_coord.insert(tile.coord, tile.id);
        self.tiles.insert(tile.id, tile);
        Ok(())
    }

    /// Look up a tile by identifier.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Look up a tile by identifier for mutation.
    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    /// Look up the tile at a coordinate.
    pub fn tile_at(&self, coord: Coord) -> Option<&Tile> {
        self.by_coord.get(&coord).and_then(|id| self.tiles.get(id))
    }

    /// Overwrite a tile with an updated copy.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TileNotFound`] if the tile is not on the map,
    /// or [`WorldError::CoordChanged`] if the copy moved.
    pub fn replace_tile(&mut self, tile: Tile) -> Result<(), WorldError> {
        let existing = self
            .tiles
            .get_mut(&tile.id)
            .ok_or(WorldError::TileNotFound(tile.id))?;
        if existing.coord != tile.coord {
            return Err(WorldError::CoordChanged {
                tile: tile.id,
                from: existing.coord,
                to: tile.coord,
            });
        }
        *existing = tile;
        Ok(())
    }

    /// Number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over tiles in identifier order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Iterate over tiles in coordinate order.
    pub fn tiles_by_coord(&self) -> impl Iterator<Item = &Tile> {
        self.by_coord.values().filter_map(|id| self.tiles.get(id))
    }

    /// Snapshot of terrain and tile identifiers for route planning.
    pub fn terrain_map(&self) -> TerrainMap {
        let mut map = TerrainMap::new();
        for tile in self.tiles.values() {
            map.insert(tile.coord, tile.id, tile.terrain);
        }
        map
    }

    // -------------------------------------------------------------------
    // Ownership
    // -------------------------------------------------------------------

    /// Set or clear the owner of a tile.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TileNotFound`] if the tile is not on the map.
    pub fn set_owner(&mut self, id: TileId, owner: Option<PlayerId>) -> Result<(), WorldError> {
        let tile = self.tiles.get_mut(&id).ok_or(WorldError::TileNotFound(id))?;
        tile.owner = owner;
        Ok(())
    }

    /// Tiles owned by `player`.
    pub fn tiles_owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Tile> {
        self.tiles.values().filter(move |t| t.is_owned_by(player))
    }

    /// Total population across the tiles `player` owns.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if the sum overflows.
    pub fn population_of(&self, player: PlayerId) -> Result<u64, WorldError> {
        self.tiles_owned_by(player).try_fold(0_u64, |acc, tile| {
            acc.checked_add(tile.population)
                .ok_or(WorldError::ArithmeticOverflow)
        })
    }

    // -------------------------------------------------------------------
    // Goods catalog
    // -------------------------------------------------------------------

    /// Bring every tile's inventory keys in line with the catalog.
    ///
    /// Each listed good gets a zero entry on tiles that lack one; entries
    /// for goods no longer listed are dropped along with their units.
    /// Goods in transit are not touched.
    pub fn reconcile_goods(&mut self, catalog: &GoodsCatalog) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for tile in self.tiles.values_mut() {
            for good in catalog.iter() {
                if tile.goods.list(good) {
                    report.entries_added = report.entries_added.saturating_add(1);
                }
            }

            let stale: Vec<String> = tile
                .goods
                .iter()
                .filter(|(good, _)| !catalog.contains(good))
                .map(|(good, _)| good.to_owned())
                .collect();
            for good in stale {
                let units = tile.goods.delist(&good).unwrap_or(0);
                report.entries_removed = report.entries_removed.saturating_add(1);
                report.units_discarded = report.units_discarded.saturating_add(units);
            }
        }

        if report.units_discarded > 0 {
            warn!(
                units = report.units_discarded,
                entries = report.entries_removed,
                "goods discarded while reconciling catalog"
            );
        }
        debug!(
            added = report.entries_added,
            removed = report.entries_removed,
            "goods catalog reconciled"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wargame_types::Terrain;

    fn three_tiles() -> (WorldMap, TileId, TileId) {
        let mut world = WorldMap::new();
        let a = Tile::new(Coord::new(0, 0), Terrain::Plains);
        let b = Tile::new(Coord::new(1, 0), Terrain::City);
        let c = Tile::new(Coord::new(2, 0), Terrain::Water);
        let (a_id, b_id) = (a.id, b.id);
        world.add_tile(a).unwrap();
        world.add_tile(b).unwrap();
        world.add_tile(c).unwrap();
        (world, a_id, b_id)
    }

    #[test]
    fn duplicate_coordinate_rejected() {
        let (mut world, _, _) = three_tiles();
        let clash = Tile::new(Coord::new(1, 0), Terrain::Forest);
        assert!(matches!(
            world.add_tile(clash),
            Err(WorldError::DuplicateCoord(_))
        ));
        assert_eq!(world.tile_count(), 3);
    }

    #[test]
    fn lookup_by_coordinate() {
        let (world, _, b) = three_tiles();
        assert_eq!(world.tile_at(Coord::new(1, 0)).map(|t| t.id), Some(b));
        assert!(world.tile_at(Coord::new(9, 9)).is_none());
    }

    #[test]
    fn replace_tile_commits_copy() {
        let (mut world, a, _) = three_tiles();
        let mut copy = world.tile(a).unwrap().clone();
        copy.goods.add("wood", 7).unwrap();
        world.replace_tile(copy).unwrap();
        assert_eq!(world.tile(a).unwrap().goods.quantity("wood"), 7);
    }

    #[test]
    fn replace_tile_cannot_move() {
        let (mut world, a, _) = three_tiles();
        let mut copy = world.tile(a).unwrap().clone();
        copy.coord = Coord::new(5, 5);
        assert!(matches!(
            world.replace_tile(copy),
            Err(WorldError::CoordChanged { .. })
        ));
    }

    #[test]
    fn terrain_map_mirrors_tiles() {
        let (world, a, _) = three_tiles();
        let map = world.terrain_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.tile_at(Coord::new(0, 0)), Some(a));
        assert_eq!(map.terrain_at(Coord::new(2, 0)), Some(Terrain::Water));
    }

    #[test]
    fn population_sums_owned_tiles() {
        let (mut world, a, b) = three_tiles();
        let player = PlayerId::new();
        world.set_owner(a, Some(player)).unwrap();
        world.set_owner(b, Some(player)).unwrap();
        world.tile_mut(a).unwrap().population = 40;
        world.tile_mut(b).unwrap().population = 260;
        assert_eq!(world.population_of(player).unwrap(), 300);
        assert_eq!(world.population_of(PlayerId::new()).unwrap(), 0);
    }

    #[test]
    fn reconcile_adds_and_removes_keys() {
        let (mut world, a, _) = three_tiles();
        world.tile_mut(a).unwrap().goods.add("salt", 3).unwrap();

        let catalog: GoodsCatalog = ["wood", "iron"].into_iter().collect();
        let report = world.reconcile_goods(&catalog);

        assert_eq!(report.entries_added, 6);
        assert_eq!(report.entries_removed, 1);
        assert_eq!(report.units_discarded, 3);
        for tile in world.tiles() {
            assert!(tile.goods.lists("wood"));
            assert!(tile.goods.lists("iron"));
            assert!(!tile.goods.lists("salt"));
        }

        // A second pass finds nothing to do.
        assert_eq!(world.reconcile_goods(&catalog), ReconcileReport::default());
    }
}
