//! Action payloads and the three-stage action lifecycle.
//!
//! An intent moves through exactly one path:
//!
//! ```text
//! Queued --accept--> Progressing --complete/fail--> Settled
//!    \------reject---------------------------------> Settled
//! ```
//!
//! Each stage is its own record type and every transition consumes the
//! previous record, so a stale stage cannot be mutated after it has moved
//! on. [`SettledAction`] exposes no mutators at all.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionKind, FailureReason};
use crate::ids::{ActionId, PlayerId, TileId};
use crate::structs::Waypoint;

// ---------------------------------------------------------------------------
// Submission requests
// ---------------------------------------------------------------------------

/// Details of a `move_goods` intent as submitted by a player.
///
/// The route is optional: when absent the engine computes it from the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveGoodsRequest {
    /// Tile the goods leave from.
    pub from: TileId,
    /// Tile the goods are delivered to.
    pub to: TileId,
    /// Name of the good.
    pub good: String,
    /// Units to ship. Must be positive.
    pub quantity: u64,
    /// Money charged when the shipment is accepted.
    pub cost: u64,
    /// Precomputed turn-boundary waypoints, if the client already has them.
    #[serde(default)]
    pub path: Option<Vec<Waypoint>>,
}

/// An intent as submitted by a player, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action_type", content = "details", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum IntentRequest {
    /// Ship goods between two tiles.
    MoveGoods(MoveGoodsRequest),
}

impl IntentRequest {
    /// The kind of action requested.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::MoveGoods(_) => ActionKind::MoveGoods,
        }
    }
}

// ---------------------------------------------------------------------------
// Validated payloads
// ---------------------------------------------------------------------------

/// A validated shipment of goods along a fixed route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveGoods {
    /// Tile the goods leave from.
    pub from: TileId,
    /// Tile the goods are delivered to.
    pub to: TileId,
    /// Name of the good.
    pub good: String,
    /// Units shipped.
    pub quantity: u64,
    /// Money charged on acceptance.
    pub cost: u64,
    /// Turn-boundary waypoints. The last entry is the destination.
    pub path: Vec<Waypoint>,
}

/// Validated, kind-specific action parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action_type", content = "details", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionPayload {
    /// Ship goods between two tiles.
    MoveGoods(MoveGoods),
}

impl ActionPayload {
    /// The kind of this action.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::MoveGoods(_) => ActionKind::MoveGoods,
        }
    }

    /// The waypoints this action travels through.
    pub fn path(&self) -> &[Waypoint] {
        match self {
            Self::MoveGoods(m) => &m.path,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 1: Queued
// ---------------------------------------------------------------------------

/// A freshly submitted intent awaiting the next resolution cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueuedAction {
    /// Action identifier, kept through every stage.
    pub id: ActionId,
    /// The submitting player.
    pub actor: PlayerId,
    /// Validated parameters.
    pub payload: ActionPayload,
    /// Wall-clock submission time.
    pub created_at: DateTime<Utc>,
}

impl QueuedAction {
    /// Create a queued action with a fresh identifier.
    pub fn new(actor: PlayerId, payload: ActionPayload) -> Self {
        Self {
            id: ActionId::new(),
            actor,
            payload,
            created_at: Utc::now(),
        }
    }

    /// The kind of this action.
    pub const fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    /// Promote to [`ProgressingAction`] with the step counter at zero.
    ///
    /// The number of required steps is the length of the payload's route.
    pub fn accept(self) -> ProgressingAction {
        let required_steps = u32::try_from(self.payload.path().len()).unwrap_or(u32::MAX);
        ProgressingAction {
            id: self.id,
            actor: self.actor,
            payload: self.payload,
            elapsed_steps: 0,
            required_steps,
        }
    }

    /// Settle as failed without ever entering progress.
    pub fn reject(self, reason: FailureReason, location: Waypoint, date: NaiveDate) -> SettledAction {
        SettledAction {
            id: self.id,
            actor: self.actor,
            payload: self.payload,
            outcome: Outcome::Failed { reason },
            location,
            completed_on: date,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 2: Progressing
// ---------------------------------------------------------------------------

/// An accepted action executing over several cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProgressingAction {
    id: ActionId,
    actor: PlayerId,
    payload: ActionPayload,
    elapsed_steps: u32,
    required_steps: u32,
}

impl ProgressingAction {
    /// Action identifier.
    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// The owning player.
    pub const fn actor(&self) -> PlayerId {
        self.actor
    }

    /// The kind of this action.
    pub const fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    /// Validated parameters, already charged.
    pub const fn payload(&self) -> &ActionPayload {
        &self.payload
    }

    /// Steps completed so far.
    pub const fn elapsed_steps(&self) -> u32 {
        self.elapsed_steps
    }

    /// Steps needed to finish.
    pub const fn required_steps(&self) -> u32 {
        self.required_steps
    }

    /// Whether the step counter has reached the required step count.
    pub const fn is_complete(&self) -> bool {
        self.elapsed_steps >= self.required_steps
    }

    /// The waypoint this cycle moves the shipment into: `path[elapsed]`.
    pub fn current_waypoint(&self) -> Option<Waypoint> {
        let index = usize::try_from(self.elapsed_steps).ok()?;
        self.payload.path().get(index).copied()
    }

    /// The waypoint the shipment sits at before this cycle:
    /// `path[elapsed - 1]`, or `None` on the first step.
    pub fn previous_waypoint(&self) -> Option<Waypoint> {
        let index = usize::try_from(self.elapsed_steps.checked_sub(1)?).ok()?;
        self.payload.path().get(index).copied()
    }

    /// Increment the step counter. Returns the new count, or `None` if the
    /// counter would overflow (the record is left untouched).
    pub const fn record_step(&mut self) -> Option<u32> {
        match self.elapsed_steps.checked_add(1) {
            Some(next) => {
                self.elapsed_steps = next;
                Some(next)
            }
            None => None,
        }
    }

    /// Settle as succeeded at `location`.
    pub fn complete(self, location: Waypoint, date: NaiveDate) -> SettledAction {
        self.settle(Outcome::Succeeded, location, date)
    }

    /// Settle as failed at `location`.
    pub fn fail(self, reason: FailureReason, location: Waypoint, date: NaiveDate) -> SettledAction {
        self.settle(Outcome::Failed { reason }, location, date)
    }

    fn settle(self, outcome: Outcome, location: Waypoint, date: NaiveDate) -> SettledAction {
        SettledAction {
            id: self.id,
            actor: self.actor,
            payload: self.payload,
            outcome,
            location,
            completed_on: date,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 3: Settled
// ---------------------------------------------------------------------------

/// Terminal result of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Outcome {
    /// The action ran to completion.
    Succeeded,
    /// The action was abandoned.
    Failed {
        /// Machine-readable reason.
        reason: FailureReason,
    },
}

impl Outcome {
    /// Whether the action succeeded.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// An immutable record of how an action ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SettledAction {
    id: ActionId,
    actor: PlayerId,
    payload: ActionPayload,
    outcome: Outcome,
    location: Waypoint,
    completed_on: NaiveDate,
}

impl SettledAction {
    /// Action identifier.
    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// The owning player.
    pub const fn actor(&self) -> PlayerId {
        self.actor
    }

    /// The kind of this action.
    pub const fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    /// Parameters the action was submitted with.
    pub const fn payload(&self) -> &ActionPayload {
        &self.payload
    }

    /// Success, or failure with a reason.
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The tile where the outcome occurred.
    pub const fn location(&self) -> Waypoint {
        self.location
    }

    /// Calendar date at settlement.
    pub const fn completed_on(&self) -> NaiveDate {
        self.completed_on
    }
}

// ---------------------------------------------------------------------------
// Any stage
// ---------------------------------------------------------------------------

/// The stage an action is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionStage {
    /// Submitted, awaiting the next cycle.
    Queued,
    /// Accepted and moving.
    Progressing,
    /// Finished.
    Settled,
}

/// An action record in whichever stage it currently occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "stage", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionRecord {
    /// Awaiting the next cycle.
    Queued(QueuedAction),
    /// Accepted and moving.
    Progressing(ProgressingAction),
    /// Finished.
    Settled(SettledAction),
}

impl ActionRecord {
    /// Action identifier.
    pub const fn id(&self) -> ActionId {
        match self {
            Self::Queued(a) => a.id,
            Self::Progressing(a) => a.id,
            Self::Settled(a) => a.id,
        }
    }

    /// The owning player.
    pub const fn actor(&self) -> PlayerId {
        match self {
            Self::Queued(a) => a.actor,
            Self::Progressing(a) => a.actor,
            Self::Settled(a) => a.actor,
        }
    }

    /// The current stage.
    pub const fn stage(&self) -> ActionStage {
        match self {
            Self::Queued(_) => ActionStage::Queued,
            Self::Progressing(_) => ActionStage::Progressing,
            Self::Settled(_) => ActionStage::Settled,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::structs::Coord;

    fn waypoint(x: i32) -> Waypoint {
        Waypoint::new(TileId::new(), Coord::new(x, 0))
    }

    fn shipment(path: Vec<Waypoint>) -> ActionPayload {
        ActionPayload::MoveGoods(MoveGoods {
            from: TileId::new(),
            to: path.last().map_or_else(TileId::new, |w| w.tile_id),
            good: "wood".to_owned(),
            quantity: 20,
            cost: 10,
            path,
        })
    }

    fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(1100, 1, 1).unwrap()
    }

    #[test]
    fn accept_sets_required_steps_from_path() {
        let queued = QueuedAction::new(PlayerId::new(), shipment(vec![waypoint(1), waypoint(2), waypoint(3)]));
        let id = queued.id;
        let progressing = queued.accept();
        assert_eq!(progressing.id(), id);
        assert_eq!(progressing.elapsed_steps(), 0);
        assert_eq!(progressing.required_steps(), 3);
        assert!(!progressing.is_complete());
    }

    #[test]
    fn waypoints_follow_step_counter() {
        let path = vec![waypoint(1), waypoint(2)];
        let mut progressing = QueuedAction::new(PlayerId::new(), shipment(path.clone())).accept();

        assert_eq!(progressing.current_waypoint(), path.first().copied());
        assert_eq!(progressing.previous_waypoint(), None);

        assert_eq!(progressing.record_step(), Some(1));
        assert_eq!(progressing.current_waypoint(), path.get(1).copied());
        assert_eq!(progressing.previous_waypoint(), path.first().copied());

        assert_eq!(progressing.record_step(), Some(2));
        assert!(progressing.is_complete());
        assert_eq!(progressing.current_waypoint(), None);
    }

    #[test]
    fn reject_records_reason_and_location() {
        let queued = QueuedAction::new(PlayerId::new(), shipment(vec![waypoint(1)]));
        let at = waypoint(0);
        let settled = queued.reject(FailureReason::NotEnoughGoods, at, epoch());
        assert_eq!(
            settled.outcome(),
            Outcome::Failed {
                reason: FailureReason::NotEnoughGoods
            }
        );
        assert_eq!(settled.location(), at);
        assert_eq!(settled.completed_on(), epoch());
    }

    #[test]
    fn complete_is_success() {
        let progressing = QueuedAction::new(PlayerId::new(), shipment(vec![waypoint(1)])).accept();
        let settled = progressing.complete(waypoint(1), epoch());
        assert!(settled.outcome().is_success());
        assert_eq!(settled.kind(), ActionKind::MoveGoods);
    }

    #[test]
    fn intent_request_wire_format() {
        let json = serde_json::json!({
            "action_type": "move_goods",
            "details": {
                "from": TileId::new(),
                "to": TileId::new(),
                "good": "iron",
                "quantity": 5,
                "cost": 2
            }
        });
        let request: IntentRequest = serde_json::from_value(json).unwrap();
        let IntentRequest::MoveGoods(details) = request;
        assert_eq!(details.good, "iron");
        assert!(details.path.is_none());
    }

    #[test]
    fn record_reports_stage() {
        let queued = QueuedAction::new(PlayerId::new(), shipment(vec![waypoint(1)]));
        let id = queued.id;
        let record = ActionRecord::Queued(queued.clone());
        assert_eq!(record.stage(), ActionStage::Queued);
        assert_eq!(record.id(), id);

        let record = ActionRecord::Progressing(queued.accept());
        assert_eq!(record.stage(), ActionStage::Progressing);
        assert_eq!(record.id(), id);
    }

    #[test]
    fn outcome_wire_format() {
        let json = serde_json::to_value(Outcome::Failed {
            reason: FailureReason::NotEnoughMoney,
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "not_enough_money");
    }
}
