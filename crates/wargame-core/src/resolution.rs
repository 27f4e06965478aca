//! The resolution engine: one operator-triggered turn advance.
//!
//! A cycle runs these steps in a fixed order:
//!
//! 1. **Calendar** -- create the calendar at the epoch if it is missing.
//! 2. **Drain** -- every queued action is checked against the source
//!    tile's inventory and the actor's balance. Passing actions are charged
//!    and become progressing; failing ones settle as failed.
//! 3. **Advance** -- every progressing action (including those accepted in
//!    step 2) moves one hop along its path, shifting its goods between the
//!    tiles' in-transit ledgers. Actions that reach the end of their path
//!    deliver into the destination inventory and settle as succeeded.
//! 4. **Calendar** -- advance by one day.
//! 5. **Sessions** -- on an end-turn cycle, log out every non-privileged
//!    player.
//!
//! Validation and integrity failures settle the offending action and never
//! stop the cycle. Unexpected errors leave the action in the stage it was
//! in before the step and are reported in the summary.
//!
//! A hop is computed on copies of the tiles it touches and written back only
//! once the conservation check passes, so a failed step leaves the map as
//! it was.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use wargame_ledger::conservation::verify_hop;
use wargame_ledger::{ConservationResult, HopTotals, LedgerError, balance};
use wargame_types::{
    ActionId, ActionPayload, FailureReason, PlayerId, QueuedAction, SettledAction, TileId,
    Waypoint,
};
use wargame_world::{Tile, WorldError};

use crate::calendar::CalendarError;
use crate::players::PlayerError;
use crate::state::GameState;
use crate::store::{ActionStore, StoreError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that abort a cycle before it touches any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The calendar cannot advance.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// An unexpected failure while processing one action.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A goods or balance operation failed after its precondition passed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A tile lookup or write failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The store rejected a transition.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A player lookup or debit failed.
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// A waypoint names a tile that is no longer on the map.
    #[error("tile {0} is no longer on the map")]
    TileVanished(TileId),

    /// The action's step counter already passed the end of its path.
    #[error("action {0} has no waypoint left")]
    PathExhausted(ActionId),

    /// The step counter would overflow.
    #[error("step counter overflow on action {0}")]
    CounterOverflow(ActionId),

    /// In-transit totals did not balance across the hop.
    #[error("{0}")]
    Conservation(String),
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// An action that hit an unexpected error during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleFailure {
    /// The affected action, left in its pre-step stage.
    pub action_id: ActionId,
    /// What went wrong.
    pub error: String,
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    /// Date stamped on actions settled during the cycle.
    pub resolved_on: NaiveDate,
    /// Calendar date after the cycle.
    pub new_date: NaiveDate,
    /// Whether this was an end-turn cycle.
    pub end_turn: bool,
    /// Queued actions promoted to progressing.
    pub accepted: u64,
    /// Queued actions settled as failed during the drain.
    pub rejected: u64,
    /// Progressing actions moved one hop.
    pub advanced: u64,
    /// Actions settled as succeeded.
    pub succeeded: u64,
    /// Progressing actions settled as failed.
    pub failed: u64,
    /// Actions left untouched because of an unexpected error.
    pub internal_errors: Vec<CycleFailure>,
    /// Sessions closed by an end-turn cycle.
    pub sessions_terminated: u64,
}

impl ResolutionSummary {
    const fn new(resolved_on: NaiveDate, new_date: NaiveDate, end_turn: bool) -> Self {
        Self {
            resolved_on,
            new_date,
            end_turn,
            accepted: 0,
            rejected: 0,
            advanced: 0,
            succeeded: 0,
            failed: 0,
            internal_errors: Vec::new(),
            sessions_terminated: 0,
        }
    }

    fn internal(&mut self, action_id: ActionId, err: &StepError) {
        error!(action_id = %action_id, error = %err, "action left unchanged after internal error");
        self.internal_errors.push(CycleFailure {
            action_id,
            error: err.to_string(),
        });
    }
}

const fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// Run one resolution cycle.
///
/// # Errors
///
/// Returns [`ResolutionError::Calendar`] if the calendar cannot advance.
/// The check happens before anything else, so state is untouched on error.
pub fn run_cycle<S: ActionStore>(
    state: &mut GameState<S>,
    end_turn: bool,
) -> Result<ResolutionSummary, ResolutionError> {
    // 1. Calendar exists, and can advance once the cycle is done.
    let today = state.ensure_calendar().date();
    let tomorrow = today
        .succ_opt()
        .ok_or(CalendarError::DateOverflow(today))?;
    let mut summary = ResolutionSummary::new(today, tomorrow, end_turn);

    // 2. Drain the queue as it stands now.
    let queued = state.actions.take_queued();
    let mut deferred = Vec::new();
    for action in queued {
        let id = action.id;
        match drain_one(state, action, today) {
            Drained::Accepted => bump(&mut summary.accepted),
            Drained::Rejected => bump(&mut summary.rejected),
            Drained::Deferred(action, err) => {
                summary.internal(id, &err);
                deferred.push(*action);
            }
        }
    }
    state.actions.restore_queued(deferred);

    // 3. Advance everything in progress, exactly once.
    for id in state.actions.progressing_ids() {
        match advance_one(state, id, today) {
            Ok(Advanced::Moved) => bump(&mut summary.advanced),
            Ok(Advanced::Delivered) => {
                bump(&mut summary.advanced);
                bump(&mut summary.succeeded);
            }
            Ok(Advanced::Lost) => bump(&mut summary.failed),
            Err(err) => summary.internal(id, &err),
        }
    }

    // 4. One day passes.
    state.ensure_calendar().advance()?;

    // 5. End of turn logs players out.
    if end_turn {
        summary.sessions_terminated = state.sessions.terminate_non_privileged(&state.players);
    }

    info!(
        date = %today,
        new_date = %summary.new_date,
        end_turn,
        accepted = summary.accepted,
        rejected = summary.rejected,
        advanced = summary.advanced,
        succeeded = summary.succeeded,
        failed = summary.failed,
        internal_errors = summary.internal_errors.len(),
        "resolution cycle complete"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Step 2: drain
// ---------------------------------------------------------------------------

enum Drained {
    Accepted,
    Rejected,
    /// Not processed; goes back on the queue.
    Deferred(Box<QueuedAction>, StepError),
}

/// Validate, charge and promote one queued action.
///
/// Any failure other than a validation rejection hands the action back
/// untouched, with every charge already made reversed.
fn drain_one<S: ActionStore>(
    state: &mut GameState<S>,
    action: QueuedAction,
    today: NaiveDate,
) -> Drained {
    let ActionPayload::MoveGoods(shipment) = &action.payload;
    let (id, actor, cost) = (action.id, action.actor, shipment.cost);

    let Some(source) = state.world.tile(shipment.from) else {
        let missing = shipment.from;
        return match shipment.path.last().copied() {
            Some(location) => reject(state, action, FailureReason::UnknownTile, location, today),
            None => Drained::Deferred(Box::new(action), StepError::TileVanished(missing)),
        };
    };
    let at_source = source.waypoint();

    if shipment.path.is_empty() {
        return reject(state, action, FailureReason::NoRoute, at_source, today);
    }
    // (a) the source holds the goods.
    if !source.goods.has_at_least(&shipment.good, shipment.quantity) {
        return reject(state, action, FailureReason::NotEnoughGoods, at_source, today);
    }
    // (b) the actor can pay.
    let funds = match state.players.balance(actor) {
        Ok(funds) => funds,
        Err(err) => return Drained::Deferred(Box::new(action), err.into()),
    };
    if !balance::covers(funds, cost) {
        return reject(state, action, FailureReason::NotEnoughMoney, at_source, today);
    }
    if state.actions.find(id).is_some() {
        return Drained::Deferred(Box::new(action), StoreError::Duplicate(id).into());
    }

    let mut charged_source = source.clone();
    if let Err(err) = charged_source.goods.remove(&shipment.good, shipment.quantity) {
        return Drained::Deferred(Box::new(action), err.into());
    }

    // The store takes the record first so a refused write charges nothing.
    let progressing = action.clone().accept();
    let required_steps = progressing.required_steps();
    if let Err(err) = state.actions.insert_progressing(progressing) {
        return Drained::Deferred(Box::new(action), err.into());
    }
    if let Err(err) = state.players.debit(actor, cost) {
        unpromote(state, id);
        return Drained::Deferred(Box::new(action), err.into());
    }
    if let Err(err) = state.world.replace_tile(charged_source) {
        unpromote(state, id);
        if let Err(refund) = state.players.credit(actor, cost) {
            error!(action_id = %id, player = %actor, error = %refund, "refund failed");
        }
        return Drained::Deferred(Box::new(action), err.into());
    }

    debug!(
        action_id = %id,
        player = %actor,
        required_steps,
        "action accepted"
    );
    Drained::Accepted
}

/// Drop the progressing record of an action whose charge did not go through.
fn unpromote<S: ActionStore>(state: &mut GameState<S>, id: ActionId) {
    if state.actions.take_progressing(id).is_none() {
        error!(action_id = %id, "progressing record missing during rollback");
    }
}

fn reject<S: ActionStore>(
    state: &mut GameState<S>,
    action: QueuedAction,
    reason: FailureReason,
    location: Waypoint,
    today: NaiveDate,
) -> Drained {
    debug!(
        action_id = %action.id,
        player = %action.actor,
        %reason,
        tile = %location.tile_id,
        "action rejected"
    );
    let settled = action.clone().reject(reason, location, today);
    match record(state, settled) {
        Ok(()) => Drained::Rejected,
        Err(err) => Drained::Deferred(Box::new(action), err),
    }
}

fn record<S: ActionStore>(state: &mut GameState<S>, settled: SettledAction) -> Result<(), StepError> {
    state.actions.settle(settled)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Step 3: advance
// ---------------------------------------------------------------------------

enum Advanced {
    Moved,
    Delivered,
    Lost,
}

/// Move one progressing action a single hop.
#[allow(clippy::too_many_lines)]
fn advance_one<S: ActionStore>(
    state: &mut GameState<S>,
    id: ActionId,
    today: NaiveDate,
) -> Result<Advanced, StepError> {
    let mut action = state
        .actions
        .progressing(id)
        .cloned()
        .ok_or(StoreError::ProgressingNotFound(id))?;
    let actor = action.actor();
    let ActionPayload::MoveGoods(shipment) = action.payload();
    let (good, quantity) = (shipment.good.clone(), shipment.quantity);

    let current = action
        .current_waypoint()
        .ok_or(StepError::PathExhausted(id))?;
    let previous = action.previous_waypoint();

    // Working copies of every tile this hop touches.
    let mut tiles: BTreeMap<TileId, Tile> = BTreeMap::new();
    for waypoint in previous.iter().chain(core::iter::once(&current)) {
        let tile = state
            .world
            .tile(waypoint.tile_id)
            .ok_or(StepError::TileVanished(waypoint.tile_id))?;
        tiles.entry(waypoint.tile_id).or_insert_with(|| tile.clone());
    }
    let held_before = held_in_transit(&tiles, actor, &good)?;

    let mut injected = 0;
    if let Some(previous) = previous {
        let from = tiles
            .get_mut(&previous.tile_id)
            .ok_or(StepError::TileVanished(previous.tile_id))?;
        let available = from.moving_goods.held(actor, &good);
        if available < quantity {
            warn!(
                action_id = %id,
                player = %actor,
                good = %good,
                expected = quantity,
                available,
                tile = %previous.tile_id,
                "goods lost in transit"
            );
            let lost = state
                .actions
                .take_progressing(id)
                .ok_or(StoreError::ProgressingNotFound(id))?;
            record(state, lost.fail(FailureReason::GoodsLostInTransit, previous, today))?;
            return Ok(Advanced::Lost);
        }
        from.moving_goods.withdraw(actor, &good, quantity)?;
    } else {
        injected = quantity;
    }

    let here = tiles
        .get_mut(&current.tile_id)
        .ok_or(StepError::TileVanished(current.tile_id))?;
    here.moving_goods.deposit(actor, &good, quantity)?;
    action.record_step().ok_or(StepError::CounterOverflow(id))?;

    let delivered = action.is_complete();
    let mut absorbed = 0;
    if delivered {
        here.moving_goods.withdraw(actor, &good, quantity)?;
        here.goods.add(&good, quantity)?;
        absorbed = quantity;
    }

    let held_after = held_in_transit(&tiles, actor, &good)?;
    let check = verify_hop(&HopTotals {
        actor,
        good,
        held_before,
        held_after,
        injected,
        absorbed,
    });
    if let ConservationResult::Anomaly(anomaly) = check {
        return Err(StepError::Conservation(anomaly.message));
    }

    for tile in tiles.into_values() {
        state.world.replace_tile(tile)?;
    }

    if delivered {
        let done = state
            .actions
            .take_progressing(id)
            .ok_or(StoreError::ProgressingNotFound(id))?;
        debug!(action_id = %id, player = %actor, tile = %current.tile_id, "action delivered");
        record(state, done.complete(current, today))?;
        Ok(Advanced::Delivered)
    } else {
        debug!(
            action_id = %id,
            step = action.elapsed_steps(),
            of = action.required_steps(),
            "action advanced"
        );
        state.actions.update_progressing(action)?;
        Ok(Advanced::Moved)
    }
}

/// The actor's in-transit quantity of `good` summed over `tiles`.
fn held_in_transit(
    tiles: &BTreeMap<TileId, Tile>,
    actor: PlayerId,
    good: &str,
) -> Result<u64, StepError> {
    tiles
        .values()
        .try_fold(0_u64, |acc, tile| acc.checked_add(tile.moving_goods.held(actor, good)))
        .ok_or(StepError::Ledger(LedgerError::ArithmeticOverflow(
            "transit total overflow",
        )))
}
