//! End-to-end resolution scenarios.
//!
//! Each test builds a small hand-made map, queues intents through the
//! public submission path and drives whole cycles with
//! [`run_cycle`], checking tiles, balances and action records afterwards.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use chrono::NaiveDate;
use wargame_core::intents::{list_actions, submit_intent};
use wargame_core::players::{NewPlayer, PlayerRegistry};
use wargame_core::resolution::run_cycle;
use wargame_core::state::GameState;
use wargame_core::store::{ActionStore, MemoryActionStore, StoreError};
use wargame_types::{
    ActionId, ActionRecord, Coord, FailureReason, IntentRequest, MoveGoodsRequest, Outcome,
    PlayerId, ProgressingAction, QueuedAction, SettledAction, Terrain, TileId, Waypoint,
};
use wargame_world::{GoodsCatalog, Tile, WorldMap};

// =============================================================================
// Fixture
// =============================================================================

struct Scenario {
    state: GameState,
    actor: PlayerId,
    /// Tiles along row 0, left to right.
    row: Vec<TileId>,
}

impl Scenario {
    /// A `len` x 1 strip of plains. Tile 0 holds 50 wood and 5 iron; the
    /// actor has 100 money.
    fn strip(len: i32) -> Self {
        let mut world = WorldMap::new();
        let mut row = Vec::new();
        for x in 0..len {
            let mut tile = Tile::new(Coord::new(x, 0), Terrain::Plains);
            if x == 0 {
                tile.goods.add("wood", 50).unwrap();
                tile.goods.add("iron", 5).unwrap();
            }
            row.push(tile.id);
            world.add_tile(tile).unwrap();
        }
        let catalog: GoodsCatalog = ["wood", "iron"].into_iter().collect();
        world.reconcile_goods(&catalog);

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
            catalog,
            players,
            MemoryActionStore::new(),
            NaiveDate::from_ymd_opt(1100, 1, 1).unwrap(),
            2,
        );
        Self { state, actor, row }
    }

    fn waypoint(&self, index: usize) -> Waypoint {
        self.state.world.tile(self.row[index]).unwrap().waypoint()
    }

    fn tile(&self, index: usize) -> &Tile {
        self.state.world.tile(self.row[index]).unwrap()
    }

    /// Queue a shipment from tile 0 along an explicit path of row indices.
    fn ship(&mut self, good: &str, quantity: u64, cost: u64, hops: &[usize]) -> ActionId {
        let path: Vec<Waypoint> = hops.iter().map(|&i| self.waypoint(i)).collect();
        let to = path.last().unwrap().tile_id;
        submit_intent(
            &mut self.state,
            self.actor,
            IntentRequest::MoveGoods(MoveGoodsRequest {
                from: self.row[0],
                to,
                good: good.to_owned(),
                quantity,
                cost,
                path: Some(path),
            }),
        )
        .unwrap()
    }

    fn money(&self) -> u64 {
        self.state.players.balance(self.actor).unwrap()
    }

    fn any_in_transit(&self) -> bool {
        self.state
            .world
            .tiles()
            .any(|t| t.moving_goods.has_actor(self.actor))
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn three_hop_shipment_delivers_after_three_cycles() {
    let mut s = Scenario::strip(4);
    let id = s.ship("wood", 20, 10, &[1, 2, 3]);

    run_cycle(&mut s.state, false).unwrap();
    assert_eq!(s.tile(0).goods.quantity("wood"), 30);
    assert_eq!(s.money(), 90);
    let listing = list_actions(&s.state, s.actor);
    assert!(listing.queued.is_empty());
    assert_eq!(listing.progressing.len(), 1);
    assert_eq!(listing.progressing[0].id(), id);
    assert_eq!(listing.progressing[0].elapsed_steps(), 1);
    assert_eq!(listing.progressing[0].required_steps(), 3);
    assert_eq!(s.tile(1).moving_goods.held(s.actor, "wood"), 20);

    run_cycle(&mut s.state, false).unwrap();
    assert!(!s.tile(1).moving_goods.has_actor(s.actor));
    assert_eq!(s.tile(2).moving_goods.held(s.actor, "wood"), 20);

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(s.tile(3).goods.quantity("wood"), 20);
    assert!(!s.any_in_transit());

    // Charged once, at drain time.
    assert_eq!(s.tile(0).goods.quantity("wood"), 30);
    assert_eq!(s.money(), 90);

    let listing = list_actions(&s.state, s.actor);
    assert!(listing.progressing.is_empty());
    assert_eq!(listing.settled.len(), 1);
    let settled = &listing.settled[0];
    assert_eq!(settled.action.outcome(), Outcome::Succeeded);
    assert_eq!(settled.action.location().tile_id, s.row[3]);
    assert_eq!(
        settled.action.completed_on(),
        NaiveDate::from_ymd_opt(1100, 1, 3).unwrap()
    );
    // Calendar is at 1100-01-04 after three cycles.
    assert_eq!(settled.days_ago, 1);
}

#[test]
fn shortage_of_goods_leaves_inventory_and_money() {
    let mut s = Scenario::strip(3);
    s.ship("iron", 10, 10, &[1, 2]);

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.accepted, 0);
    assert_eq!(s.tile(0).goods.quantity("iron"), 5);
    assert_eq!(s.money(), 100);

    let listing = list_actions(&s.state, s.actor);
    assert_eq!(listing.settled.len(), 1);
    assert_eq!(
        listing.settled[0].action.outcome(),
        Outcome::Failed {
            reason: FailureReason::NotEnoughGoods
        }
    );
    assert_eq!(listing.settled[0].action.location().tile_id, s.row[0]);
}

#[test]
fn each_failing_action_settles_once_and_others_proceed() {
    let mut s = Scenario::strip(3);
    s.ship("iron", 10, 10, &[1, 2]);
    s.ship("wood", 5, 500, &[1, 2]);
    let good = s.ship("wood", 5, 10, &[1]);

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(s.money(), 90);
    assert_eq!(s.tile(0).goods.quantity("wood"), 45);
    assert_eq!(s.tile(1).goods.quantity("wood"), 5);

    let settled = s.state.actions.settled_for(s.actor);
    assert_eq!(settled.len(), 3);
    assert!(settled.iter().any(|a| a.id() == good && a.outcome().is_success()));
}

#[test]
fn drained_actions_advance_in_the_same_cycle_exactly_once() {
    let mut s = Scenario::strip(5);
    let id = s.ship("wood", 1, 1, &[1, 2, 3, 4]);

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.advanced, 1);
    assert_eq!(s.state.actions.progressing(id).unwrap().elapsed_steps(), 1);

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.advanced, 1);
    assert_eq!(s.state.actions.progressing(id).unwrap().elapsed_steps(), 2);
}

#[test]
fn transit_loss_fails_only_the_damaged_shipment() {
    let mut s = Scenario::strip(4);
    let damaged = s.ship("wood", 10, 1, &[1, 2, 3]);
    let intact = s.ship("iron", 5, 1, &[1, 2, 3]);
    run_cycle(&mut s.state, false).unwrap();

    let hop = s.row[1];
    let actor = s.actor;
    s.state
        .world
        .tile_mut(hop)
        .unwrap()
        .moving_goods
        .withdraw(actor, "wood", 4)
        .unwrap();

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.advanced, 1);

    let lost = s
        .state
        .actions
        .settled_for(actor)
        .into_iter()
        .find(|a| a.id() == damaged)
        .unwrap()
        .clone();
    assert_eq!(
        lost.outcome(),
        Outcome::Failed {
            reason: FailureReason::GoodsLostInTransit
        }
    );
    assert_eq!(lost.location().tile_id, hop);
    assert_eq!(s.state.actions.progressing(intact).unwrap().elapsed_steps(), 2);
    assert_eq!(s.tile(2).moving_goods.held(actor, "iron"), 5);

    // Never retried.
    run_cycle(&mut s.state, false).unwrap();
    assert!(s.state.actions.progressing(damaged).is_none());
    assert_eq!(s.state.actions.settled_for(actor).len(), 2);
}

#[test]
fn vanished_waypoint_keeps_action_at_its_pre_step_stage() {
    let mut s = Scenario::strip(3);
    let id = s.ship("wood", 10, 1, &[1, 2]);
    run_cycle(&mut s.state, false).unwrap();

    // Point the next hop at a tile that is not on the map.
    let ghost = Waypoint::new(TileId::new(), Coord::new(9, 9));
    let mut action = s.state.actions.progressing(id).unwrap().clone();
    let before = action.elapsed_steps();
    let wargame_types::ActionPayload::MoveGoods(details) = action.payload().clone();
    let mut path = details.path;
    path[1] = ghost;
    action = rebuild_with_path(&action, path);
    s.state.actions.update_progressing(action).unwrap();

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.internal_errors.len(), 1);
    assert_eq!(summary.internal_errors[0].action_id, id);
    assert_eq!(s.state.actions.progressing(id).unwrap().elapsed_steps(), before);
    assert_eq!(s.tile(1).moving_goods.held(s.actor, "wood"), 10);
}

/// Re-issue a progressing action with a different path and the same
/// elapsed step count, through the serialised form.
fn rebuild_with_path(
    action: &ProgressingAction,
    path: Vec<Waypoint>,
) -> ProgressingAction {
    let mut json = serde_json::to_value(action).unwrap();
    json["payload"]["details"]["path"] = serde_json::to_value(path).unwrap();
    serde_json::from_value(json).unwrap()
}

#[test]
fn queue_submitted_after_snapshot_waits_for_next_cycle() {
    let mut s = Scenario::strip(3);
    let first = s.ship("wood", 5, 1, &[1, 2]);
    run_cycle(&mut s.state, false).unwrap();
    let second = s.ship("wood", 5, 1, &[1, 2]);

    assert!(s.state.actions.progressing(first).is_some());
    assert!(s.state.actions.progressing(second).is_none());
    assert_eq!(s.state.actions.queued_for(s.actor).len(), 1);

    run_cycle(&mut s.state, false).unwrap();
    assert_eq!(s.state.actions.progressing(second).unwrap().elapsed_steps(), 1);
}

#[test]
fn end_turn_flag_terminates_only_player_sessions() {
    let mut s = Scenario::strip(2);
    let operator = s
        .state
        .players
        .register(NewPlayer {
            display_name: "operator".to_owned(),
            money: 0,
            color: None,
            privileged: true,
        })
        .unwrap()
        .id;
    let op_session = s.state.sessions.open(operator);
    let red_session = s.state.sessions.open(s.actor);

    let summary = run_cycle(&mut s.state, false).unwrap();
    assert_eq!(summary.sessions_terminated, 0);
    assert_eq!(s.state.sessions.len(), 2);

    let summary = run_cycle(&mut s.state, true).unwrap();
    assert!(summary.end_turn);
    assert_eq!(summary.sessions_terminated, 1);
    assert_eq!(s.state.sessions.player_for(op_session.id), Some(operator));
    assert_eq!(s.state.sessions.player_for(red_session.id), None);
}

/// A store that refuses to promote actions while `refuse` is set.
#[derive(Debug, Default)]
struct RefusingStore {
    inner: MemoryActionStore,
    refuse: bool,
}

impl ActionStore for RefusingStore {
    fn enqueue(&mut self, action: QueuedAction) -> Result<(), StoreError> {
        self.inner.enqueue(action)
    }

    fn remove_queued(&mut self, actor: PlayerId, id: ActionId) -> Result<QueuedAction, StoreError> {
        self.inner.remove_queued(actor, id)
    }

    fn take_queued(&mut self) -> Vec<QueuedAction> {
        self.inner.take_queued()
    }

    fn restore_queued(&mut self, actions: Vec<QueuedAction>) {
        self.inner.restore_queued(actions);
    }

    fn progressing_ids(&self) -> Vec<ActionId> {
        self.inner.progressing_ids()
    }

    fn progressing(&self, id: ActionId) -> Option<&ProgressingAction> {
        self.inner.progressing(id)
    }

    fn insert_progressing(&mut self, action: ProgressingAction) -> Result<(), StoreError> {
        if self.refuse {
            return Err(StoreError::ProgressingNotFound(action.id()));
        }
        self.inner.insert_progressing(action)
    }

    fn update_progressing(&mut self, action: ProgressingAction) -> Result<(), StoreError> {
        self.inner.update_progressing(action)
    }

    fn take_progressing(&mut self, id: ActionId) -> Option<ProgressingAction> {
        self.inner.take_progressing(id)
    }

    fn settle(&mut self, action: SettledAction) -> Result<(), StoreError> {
        self.inner.settle(action)
    }

    fn queued_for(&self, actor: PlayerId) -> Vec<&QueuedAction> {
        self.inner.queued_for(actor)
    }

    fn progressing_for(&self, actor: PlayerId) -> Vec<&ProgressingAction> {
        self.inner.progressing_for(actor)
    }

    fn settled_for(&self, actor: PlayerId) -> Vec<&SettledAction> {
        self.inner.settled_for(actor)
    }

    fn find(&self, id: ActionId) -> Option<ActionRecord> {
        self.inner.find(id)
    }
}

#[test]
fn refused_promotion_leaves_action_queued_and_uncharged() {
    let s = Scenario::strip(3);
    let path = vec![s.waypoint(1), s.waypoint(2)];
    let (from, to) = (s.row[0], s.row[2]);
    let actor = s.actor;
    let mut state = GameState::new(
        s.state.world,
        s.state.catalog,
        s.state.players,
        RefusingStore {
            inner: MemoryActionStore::new(),
            refuse: true,
        },
        NaiveDate::from_ymd_opt(1100, 1, 1).unwrap(),
        2,
    );
    let id = submit_intent(
        &mut state,
        actor,
        IntentRequest::MoveGoods(MoveGoodsRequest {
            from,
            to,
            good: "wood".to_owned(),
            quantity: 20,
            cost: 10,
            path: Some(path),
        }),
    )
    .unwrap();

    let summary = run_cycle(&mut state, false).unwrap();
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.internal_errors.len(), 1);
    assert_eq!(summary.internal_errors[0].action_id, id);
    assert_eq!(state.players.balance(actor).unwrap(), 100);
    assert_eq!(state.world.tile(from).unwrap().goods.quantity("wood"), 50);
    assert!(matches!(state.actions.find(id), Some(ActionRecord::Queued(_))));

    // Once the store accepts writes the same action goes through.
    state.actions.refuse = false;
    let summary = run_cycle(&mut state, false).unwrap();
    assert_eq!(summary.accepted, 1);
    assert_eq!(state.players.balance(actor).unwrap(), 90);
    assert_eq!(state.world.tile(from).unwrap().goods.quantity("wood"), 30);
    assert!(matches!(
        state.actions.find(id),
        Some(ActionRecord::Progressing(_))
    ));
}
