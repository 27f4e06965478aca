//! Seeded generation of the starting map.
//!
//! Terrain and population are drawn from a [`SmallRng`] seeded from the
//! configuration, so the same seed always yields the same map layout (tile
//! identifiers are fresh on every run).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use wargame_ledger::Stock;
use wargame_types::{Coord, PlayerId, Terrain, TileId};

use crate::catalog::GoodsCatalog;
use crate::error::WorldError;
use crate::tile::Tile;
use crate::world_map::WorldMap;

/// Terrain weights out of 100, in draw order.
const TERRAIN_WEIGHTS: [(Terrain, u32); 6] = [
    (Terrain::Plains, 35),
    (Terrain::Fields, 20),
    (Terrain::Forest, 15),
    (Terrain::Water, 12),
    (Terrain::Mountains, 10),
    (Terrain::City, 8),
];

/// Inputs for [`create_starting_world`].
#[derive(Debug, Clone)]
pub struct WorldParams {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// RNG seed for terrain and population.
    pub seed: u64,
    /// Goods placed on every land tile.
    pub starting_stock: Stock,
}

/// Generate a `width` x `height` map and reconcile it against `catalog`.
///
/// # Errors
///
/// Returns [`WorldError::InvalidDimensions`] for an empty grid or one that
/// does not fit in `i32` coordinates.
pub fn create_starting_world(
    params: &WorldParams,
    catalog: &GoodsCatalog,
) -> Result<WorldMap, WorldError> {
    let invalid = || WorldError::InvalidDimensions {
        width: params.width,
        height: params.height,
    };
    if params.width == 0 || params.height == 0 {
        return Err(invalid());
    }
    let width = i32::try_from(params.width).map_err(|_e| invalid())?;
    let height = i32::try_from(params.height).map_err(|_e| invalid())?;

    let mut rng = SmallRng::seed_from_u64(params.seed);
    let mut world = WorldMap::new();

    for y in 0..height {
        for x in 0..width {
            let terrain = draw_terrain(&mut rng);
            let mut tile = Tile::new(Coord::new(x, y), terrain);
            tile.population = draw_population(&mut rng, terrain);
            if terrain != Terrain::Water {
                tile.goods = params.starting_stock.clone();
            }
            world.add_tile(tile)?;
        }
    }

    let report = world.reconcile_goods(catalog);
    info!(
        tiles = world.tile_count(),
        seed = params.seed,
        goods = catalog.len(),
        entries_added = report.entries_added,
        "starting world generated"
    );
    Ok(world)
}

fn draw_terrain(rng: &mut SmallRng) -> Terrain {
    let mut roll: u32 = rng.random_range(0..100);
    for (terrain, weight) in TERRAIN_WEIGHTS {
        if roll < weight {
            return terrain;
        }
        roll = roll.saturating_sub(weight);
    }
    Terrain::Plains
}

fn draw_population(rng: &mut SmallRng, terrain: Terrain) -> u64 {
    match terrain {
        Terrain::City => rng.random_range(200..=800),
        Terrain::Plains | Terrain::Fields => rng.random_range(10..=60),
        Terrain::Forest | Terrain::Mountains => rng.random_range(0..=15),
        Terrain::Water => 0,
    }
}

/// Give each player one unowned land tile, cities first, in coordinate
/// order. Players beyond the supply of land get nothing.
///
/// Returns the `(player, tile)` assignments made.
pub fn claim_starting_tiles(world: &mut WorldMap, players: &[PlayerId]) -> Vec<(PlayerId, TileId)> {
    let mut candidates: Vec<(bool, Coord, TileId)> = world
        .tiles_by_coord()
        .filter(|t| t.owner.is_none() && t.terrain != Terrain::Water)
        .map(|t| (t.terrain != Terrain::City, t.coord, t.id))
        .collect();
    candidates.sort();

    let assignments: Vec<(PlayerId, TileId)> = players
        .iter()
        .copied()
        .zip(candidates.into_iter().map(|(_, _, id)| id))
        .collect();

    for (player, tile) in &assignments {
        if let Some(t) = world.tile_mut(*tile) {
            t.owner = Some(*player);
        }
    }
    assignments
}
