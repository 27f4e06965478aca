//! Read-only queries over game state.

use serde::Serialize;

use wargame_types::{PlayerId, TileId};
use wargame_world::{PathError, Route, WorldError, plan_route};

use crate::players::{PlayerError, PlayerOverview};
use crate::state::GameState;
use crate::store::ActionStore;

/// Errors from read-only queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The player is not registered.
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// The tile is not on the map.
    #[error("unknown tile: {0}")]
    UnknownTile(TileId),

    /// A map aggregate failed.
    #[error("{0}")]
    World(String),

    /// No route could be planned.
    #[error(transparent)]
    Route(#[from] PathError),
}

impl From<WorldError> for QueryError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::TileNotFound(id) => Self::UnknownTile(id),
            other => Self::World(other.to_string()),
        }
    }
}

/// Answer to an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ownership {
    /// The tile asked about.
    pub tile_id: TileId,
    /// Its current owner.
    pub owner: Option<PlayerId>,
    /// Whether the caller is the owner.
    pub owned_by_caller: bool,
}

/// The caller's balance, colour and holdings.
///
/// # Errors
///
/// Returns [`QueryError::Player`] if `actor` is not registered.
pub fn player_overview<S: ActionStore>(
    state: &GameState<S>,
    actor: PlayerId,
) -> Result<PlayerOverview, QueryError> {
    let player = state
        .players
        .get(actor)
        .ok_or(PlayerError::NotFound(actor))?;
    let tiles_owned = state.world.tiles_owned_by(actor).count();
    Ok(PlayerOverview {
        id: player.id,
        display_name: player.display_name.clone(),
        money: player.money,
        color: player.color.clone(),
        privileged: player.privileged,
        tiles_owned: u64::try_from(tiles_owned).unwrap_or(u64::MAX),
        population: state.world.population_of(actor)?,
    })
}

/// Whether `actor` owns `tile`.
///
/// # Errors
///
/// Returns [`QueryError::UnknownTile`] if the tile is not on the map.
pub fn check_ownership<S: ActionStore>(
    state: &GameState<S>,
    actor: PlayerId,
    tile: TileId,
) -> Result<Ownership, QueryError> {
    let found = state.world.tile(tile).ok_or(QueryError::UnknownTile(tile))?;
    Ok(Ownership {
        tile_id: tile,
        owner: found.owner,
        owned_by_caller: found.is_owned_by(actor),
    })
}

/// Plan a route between two tiles. Uses the configured movement budget
/// unless `budget` is given.
///
/// # Errors
///
/// Returns [`QueryError::UnknownTile`] for a missing endpoint and
/// [`QueryError::Route`] when the route cannot be planned.
pub fn compute_route<S: ActionStore>(
    state: &GameState<S>,
    from: TileId,
    to: TileId,
    budget: Option<u32>,
) -> Result<Route, QueryError> {
    let start = state.world.tile(from).ok_or(QueryError::UnknownTile(from))?;
    let goal = state.world.tile(to).ok_or(QueryError::UnknownTile(to))?;
    let route = plan_route(
        start.coord,
        goal.coord,
        &state.world.terrain_map(),
        budget.unwrap_or(state.movement_budget),
    )?;
    Ok(route)
}
