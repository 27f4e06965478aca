//! Player-facing intent operations: submit, remove and list.
//!
//! Submission validates the request's shape (tiles exist, the good is in
//! the catalog, the quantity is positive, a route exists) and queues it.
//! Whether the source holds the goods and the player can pay is decided
//! later, when a resolution cycle drains the queue.

use serde::Serialize;
use tracing::debug;

use wargame_types::{
    ActionId, ActionPayload, IntentRequest, MoveGoods, MoveGoodsRequest, PlayerId,
    ProgressingAction, QueuedAction, SettledAction, TileId, Waypoint,
};
use wargame_world::{PathError, plan_route};

use crate::calendar::Calendar;
use crate::state::GameState;
use crate::store::{ActionStore, StoreError};

/// Reasons a submission or removal is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    /// The acting player is not registered.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// A referenced tile is not on the map.
    #[error("unknown tile: {0}")]
    UnknownTile(TileId),

    /// The good is not in the catalog.
    #[error("unknown good: {0}")]
    UnknownGood(String),

    /// Shipments must move at least one unit.
    #[error("quantity must be positive")]
    ZeroQuantity,

    /// An explicitly supplied path had no waypoints.
    #[error("path must contain at least one waypoint")]
    EmptyPath,

    /// A waypoint's coordinates do not match its tile.
    #[error("waypoint {0} does not match the tile at that position")]
    InvalidWaypoint(TileId),

    /// The path does not finish at the destination tile.
    #[error("path must end at the destination tile {0}")]
    PathMismatch(TileId),

    /// No route could be planned.
    #[error(transparent)]
    Route(#[from] PathError),

    /// No queued action with this id belongs to the caller.
    #[error("queued action not found: {0}")]
    NotFound(ActionId),

    /// The store refused the record.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for IntentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::QueuedNotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// A settled action annotated with how long ago it finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettledView {
    /// The record.
    #[serde(flatten)]
    pub action: SettledAction,
    /// Current date minus completion date, in days.
    pub days_ago: i64,
}

/// Everything a player has in flight or finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionListing {
    /// Awaiting the next cycle.
    pub queued: Vec<QueuedAction>,
    /// Accepted and moving.
    pub progressing: Vec<ProgressingAction>,
    /// Finished, oldest first.
    pub settled: Vec<SettledView>,
}

/// Validate and queue an intent. Returns the new action's id.
///
/// # Errors
///
/// Returns [`IntentError`] describing the first problem with the request.
pub fn submit_intent<S: ActionStore>(
    state: &mut GameState<S>,
    actor: PlayerId,
    request: IntentRequest,
) -> Result<ActionId, IntentError> {
    if state.players.get(actor).is_none() {
        return Err(IntentError::UnknownPlayer(actor));
    }

    let payload = match request {
        IntentRequest::MoveGoods(details) => ActionPayload::MoveGoods(validate_move(state, details)?),
    };

    let action = QueuedAction::new(actor, payload);
    let id = action.id;
    let kind = action.kind();
    state.actions.enqueue(action)?;
    debug!(action_id = %id, player = %actor, ?kind, "intent queued");
    Ok(id)
}

fn validate_move<S: ActionStore>(
    state: &GameState<S>,
    request: MoveGoodsRequest,
) -> Result<MoveGoods, IntentError> {
    if request.quantity == 0 {
        return Err(IntentError::ZeroQuantity);
    }
    if !state.catalog.contains(&request.good) {
        return Err(IntentError::UnknownGood(request.good));
    }
    let source = state
        .world
        .tile(request.from)
        .ok_or(IntentError::UnknownTile(request.from))?;
    let destination = state
        .world
        .tile(request.to)
        .ok_or(IntentError::UnknownTile(request.to))?;

    let path = match request.path {
        Some(path) => {
            check_path(state, &path, request.to)?;
            path
        }
        None => {
            plan_route(
                source.coord,
                destination.coord,
                &state.world.terrain_map(),
                state.movement_budget,
            )?
            .hops
        }
    };

    Ok(MoveGoods {
        from: request.from,
        to: request.to,
        good: request.good,
        quantity: request.quantity,
        cost: request.cost,
        path,
    })
}

/// A supplied path must be non-empty, name real tiles at their real
/// coordinates and end at the destination.
fn check_path<S: ActionStore>(
    state: &GameState<S>,
    path: &[Waypoint],
    destination: TileId,
) -> Result<(), IntentError> {
    let last = path.last().ok_or(IntentError::EmptyPath)?;
    for waypoint in path {
        let tile = state
            .world
            .tile(waypoint.tile_id)
            .ok_or(IntentError::UnknownTile(waypoint.tile_id))?;
        if tile.coord != waypoint.coord() {
            return Err(IntentError::InvalidWaypoint(waypoint.tile_id));
        }
    }
    if last.tile_id != destination {
        return Err(IntentError::PathMismatch(destination));
    }
    Ok(())
}

/// Withdraw a queued intent owned by `actor`.
///
/// # Errors
///
/// Returns [`IntentError::NotFound`] if the id is not queued for `actor`,
/// including when it has already moved on to a later stage.
pub fn remove_intent<S: ActionStore>(
    state: &mut GameState<S>,
    actor: PlayerId,
    id: ActionId,
) -> Result<QueuedAction, IntentError> {
    let removed = state.actions.remove_queued(actor, id)?;
    debug!(action_id = %id, player = %actor, "intent removed");
    Ok(removed)
}

/// The caller's queued, progressing and settled actions.
pub fn list_actions<S: ActionStore>(state: &GameState<S>, actor: PlayerId) -> ActionListing {
    let today = state
        .calendar
        .unwrap_or_else(|| Calendar::new(state.epoch));
    ActionListing {
        queued: state.actions.queued_for(actor).into_iter().cloned().collect(),
        progressing: state
            .actions
            .progressing_for(actor)
            .into_iter()
            .cloned()
            .collect(),
        settled: state
            .actions
            .settled_for(actor)
            .into_iter()
            .map(|action| SettledView {
                days_ago: today.days_since(action.completed_on()),
                action: action.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::players::{NewPlayer, PlayerRegistry};
    use crate::store::MemoryActionStore;
    use chrono::NaiveDate;
    use wargame_types::{Coord, Terrain};
    use wargame_world::{GoodsCatalog, Tile, WorldMap};

    struct Fixture {
        state: GameState,
        actor: PlayerId,
        a: TileId,
        c: TileId,
    }

    /// A 3x1 strip of plains with wood and iron in the catalog.
    fn fixture() -> Fixture {
        let mut world = WorldMap::new();
        let ids: Vec<TileId> = (0..3)
            .map(|x| {
                let tile = Tile::new(Coord::new(x, 0), Terrain::Plains);
                let id = tile.id;
                world.add_tile(tile).unwrap();
                id
            })
            .collect();
        let mut players = PlayerRegistry::new();
        let actor = players
            .register(NewPlayer {
                display_name: "red".to_owned(),
                money: 100,
                color: None,
                privileged: false,
            })
            .unwrap()
            .id;
        let state = GameState::new(
            world,
            ["wood", "iron"].into_iter().collect::<GoodsCatalog>(),
            players,
            MemoryActionStore::new(),
            NaiveDate::from_ymd_opt(1100, 1, 1).unwrap(),
            2,
        );
        Fixture {
            state,
            actor,
            a: *ids.first().unwrap(),
            c: *ids.get(2).unwrap(),
        }
    }

    fn request(from: TileId, to: TileId, quantity: u64, path: Option<Vec<Waypoint>>) -> IntentRequest {
        IntentRequest::MoveGoods(MoveGoodsRequest {
            from,
            to,
            good: "wood".to_owned(),
            quantity,
            cost: 10,
            path,
        })
    }

    #[test]
    fn submit_plans_route_when_path_absent() {
        let mut f = fixture();
        let id = submit_intent(&mut f.state, f.actor, request(f.a, f.c, 5, None)).unwrap();

        let listing = list_actions(&f.state, f.actor);
        assert_eq!(listing.queued.len(), 1);
        let queued = listing.queued.first().unwrap();
        assert_eq!(queued.id, id);
        assert_eq!(
            queued.payload.path().last().map(|w| w.tile_id),
            Some(f.c)
        );
    }

    #[test]
    fn submit_rejects_malformed_requests() {
        let mut f = fixture();
        let actor = f.actor;
        let (a, c) = (f.a, f.c);

        assert_eq!(
            submit_intent(&mut f.state, actor, request(a, c, 0, None)),
            Err(IntentError::ZeroQuantity)
        );
        assert_eq!(
            submit_intent(&mut f.state, actor, request(a, c, 1, Some(Vec::new()))),
            Err(IntentError::EmptyPath)
        );
        let ghost = TileId::new();
        assert_eq!(
            submit_intent(&mut f.state, actor, request(a, ghost, 1, None)),
            Err(IntentError::UnknownTile(ghost))
        );
        let stranger = PlayerId::new();
        assert_eq!(
            submit_intent(&mut f.state, stranger, request(a, c, 1, None)),
            Err(IntentError::UnknownPlayer(stranger))
        );

        let mut gold = request(a, c, 1, None);
        let IntentRequest::MoveGoods(details) = &mut gold;
        details.good = "gold".to_owned();
        assert_eq!(
            submit_intent(&mut f.state, actor, gold),
            Err(IntentError::UnknownGood("gold".to_owned()))
        );

        assert!(list_actions(&f.state, actor).queued.is_empty());
    }

    #[test]
    fn supplied_path_must_end_at_destination() {
        let mut f = fixture();
        let a_waypoint = f.state.world.tile(f.a).unwrap().waypoint();
        assert_eq!(
            submit_intent(&mut f.state, f.actor, request(f.a, f.c, 1, Some(vec![a_waypoint]))),
            Err(IntentError::PathMismatch(f.c))
        );
    }

    #[test]
    fn supplied_path_must_match_tiles() {
        let mut f = fixture();
        let wrong = Waypoint::new(f.c, Coord::new(7, 7));
        assert_eq!(
            submit_intent(&mut f.state, f.actor, request(f.a, f.c, 1, Some(vec![wrong]))),
            Err(IntentError::InvalidWaypoint(f.c))
        );
    }

    #[test]
    fn same_source_and_destination_is_a_route_error() {
        let mut f = fixture();
        assert!(matches!(
            submit_intent(&mut f.state, f.actor, request(f.a, f.a, 1, None)),
            Err(IntentError::Route(PathError::SameCell(_)))
        ));
    }

    #[test]
    fn remove_only_own_queued_intent() {
        let mut f = fixture();
        let id = submit_intent(&mut f.state, f.actor, request(f.a, f.c, 5, None)).unwrap();

        assert_eq!(
            remove_intent(&mut f.state, PlayerId::new(), id).unwrap_err(),
            IntentError::NotFound(id)
        );
        assert_eq!(remove_intent(&mut f.state, f.actor, id).unwrap().id, id);
        assert_eq!(
            remove_intent(&mut f.state, f.actor, id).unwrap_err(),
            IntentError::NotFound(id)
        );
    }
}
