//! Terrain traversal costs and the coordinate-indexed terrain map the
//! pathfinder searches.

use std::collections::BTreeMap;

use wargame_types::{Coord, Terrain, TileId, Waypoint};

/// Cost of moving into a tile of the given terrain.
///
/// City, plains and fields cost 1; forest and mountains cost 2; water
/// costs 4.
pub const fn traversal_cost(terrain: Terrain) -> u32 {
    match terrain {
        Terrain::Plains | Terrain::Fields | Terrain::City => 1,
        Terrain::Forest | Terrain::Mountains => 2,
        Terrain::Water => 4,
    }
}

/// Read-only view of the grid: which tile sits at each coordinate, and its
/// terrain. Cells absent from the map are impassable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainMap {
    cells: BTreeMap<Coord, (TileId, Terrain)>,
}

impl TerrainMap {
    /// Create an empty terrain map.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// Place a tile. An existing entry at the coordinate is replaced.
    pub fn insert(&mut self, coord: Coord, tile_id: TileId, terrain: Terrain) {
        self.cells.insert(coord, (tile_id, terrain));
    }

    /// Terrain at `coord`, if the cell is on the map.
    pub fn terrain_at(&self, coord: Coord) -> Option<Terrain> {
        self.cells.get(&coord).map(|(_, terrain)| *terrain)
    }

    /// Tile identifier at `coord`, if the cell is on the map.
    pub fn tile_at(&self, coord: Coord) -> Option<TileId> {
        self.cells.get(&coord).map(|(id, _)| *id)
    }

    /// Waypoint for the tile at `coord`, if the cell is on the map.
    pub fn waypoint_at(&self, coord: Coord) -> Option<Waypoint> {
        self.tile_at(coord).map(|id| Waypoint::new(id, coord))
    }

    /// Whether `coord` is on the map.
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the map has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(Coord, Terrain)> for TerrainMap {
    /// Build a map with a fresh tile identifier per cell. Handy for tests
    /// and tools that only care about terrain.
    fn from_iter<I: IntoIterator<Item = (Coord, Terrain)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(coord, terrain)| (coord, (TileId::new(), terrain)))
                .collect(),
        }
    }
}
