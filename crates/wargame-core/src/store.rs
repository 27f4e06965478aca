//! The action store: three disjoint collections of action records.
//!
//! [`ActionStore`] is the seam to persistence. The engine only relies on
//! the operations below; [`MemoryActionStore`] is the in-process
//! implementation the game runs on.
//!
//! An [`ActionId`] lives in at most one collection at a time. Inserting an
//! id that is already present anywhere is an error.

use std::collections::BTreeMap;

use wargame_types::{
    ActionId, ActionRecord, PlayerId, ProgressingAction, QueuedAction, SettledAction,
};

/// Errors from action store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The id is already held by some collection.
    #[error("action {0} is already stored")]
    Duplicate(ActionId),

    /// No queued action with this id belongs to the caller.
    #[error("no queued action {0} for this player")]
    QueuedNotFound(ActionId),

    /// No progressing action with this id.
    #[error("no progressing action {0}")]
    ProgressingNotFound(ActionId),
}

/// Storage for action records across their three stages.
pub trait ActionStore {
    /// Append a freshly submitted action.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the id is already stored.
    fn enqueue(&mut self, action: QueuedAction) -> Result<(), StoreError>;

    /// Remove a queued action owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueuedNotFound`] if the id is not queued or
    /// belongs to another player.
    fn remove_queued(&mut self, actor: PlayerId, id: ActionId) -> Result<QueuedAction, StoreError>;

    /// Remove and return every queued action, in submission order.
    fn take_queued(&mut self) -> Vec<QueuedAction>;

    /// Put actions back at the front of the queue, keeping their order.
    fn restore_queued(&mut self, actions: Vec<QueuedAction>);

    /// Identifiers of every progressing action.
    fn progressing_ids(&self) -> Vec<ActionId>;

    /// Look up a progressing action.
    fn progressing(&self, id: ActionId) -> Option<&ProgressingAction>;

    /// Store a newly accepted action.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the id is already stored.
    fn insert_progressing(&mut self, action: ProgressingAction) -> Result<(), StoreError>;

    /// Overwrite a progressing action with an updated copy.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProgressingNotFound`] if it is not stored.
    fn update_progressing(&mut self, action: ProgressingAction) -> Result<(), StoreError>;

    /// Remove a progressing action.
    fn take_progressing(&mut self, id: ActionId) -> Option<ProgressingAction>;

    /// Store a settled record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the id is already stored.
    fn settle(&mut self, action: SettledAction) -> Result<(), StoreError>;

    /// Queued actions of `actor`, in submission order.
    fn queued_for(&self, actor: PlayerId) -> Vec<&QueuedAction>;

    /// Progressing actions of `actor`.
    fn progressing_for(&self, actor: PlayerId) -> Vec<&ProgressingAction>;

    /// Settled actions of `actor`, in settlement order.
    fn settled_for(&self, actor: PlayerId) -> Vec<&SettledAction>;

    /// Find an action in any stage.
    fn find(&self, id: ActionId) -> Option<ActionRecord>;
}

/// In-memory [`ActionStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryActionStore {
    queued: Vec<QueuedAction>,
    progressing: BTreeMap<ActionId, ProgressingAction>,
    settled: Vec<SettledAction>,
}

impl MemoryActionStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            queued: Vec::new(),
            progressing: BTreeMap::new(),
            settled: Vec::new(),
        }
    }

    /// Record counts as `(queued, progressing, settled)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.queued.len(), self.progressing.len(), self.settled.len())
    }

    fn contains(&self, id: ActionId) -> bool {
        self.queued.iter().any(|a| a.id == id)
            || self.progressing.contains_key(&id)
            || self.settled.iter().any(|a| a.id() == id)
    }
}

impl ActionStore for MemoryActionStore {
    fn enqueue(&mut self, action: QueuedAction) -> Result<(), StoreError> {
        if self.contains(action.id) {
            return Err(StoreError::Duplicate(action.id));
        }
        self.queued.push(action);
        Ok(())
    }

    fn remove_queued(&mut self, actor: PlayerId, id: ActionId) -> Result<QueuedAction, StoreError> {
        let index = self
            .queued
            .iter()
            .position(|a| a.id == id && a.actor == actor)
            .ok_or(StoreError::QueuedNotFound(id))?;
        Ok(self.queued.remove(index))
    }

    fn take_queued(&mut self) -> Vec<QueuedAction> {
        core::mem::take(&mut self.queued)
    }

    fn restore_queued(&mut self, mut actions: Vec<QueuedAction>) {
        actions.append(&mut self.queued);
        self.queued = actions;
    }

    fn progressing_ids(&self) -> Vec<ActionId> {
        self.progressing.keys().copied().collect()
    }

    fn progressing(&self, id: ActionId) -> Option<&ProgressingAction> {
        self.progressing.get(&id)
    }

    fn insert_progressing(&mut self, action: ProgressingAction) -> Result<(), StoreError> {
        let id = action.id();
        if self.contains(id) {
            return Err(StoreError::Duplicate(id));
        }
        self.progressing.insert(id, action);
        Ok(())
    }

    fn update_progressing(&mut self, action: ProgressingAction) -> Result<(), StoreError> {
        let slot = self
            .progressing
            .get_mut(&action.id())
            .ok_or(StoreError::ProgressingNotFound(action.id()))?;
        *slot = action;
        Ok(())
    }

    fn take_progressing(&mut self, id: ActionId) -> Option<ProgressingAction> {
        self.progressing.remove(&id)
    }

    fn settle(&mut self, action: SettledAction) -> Result<(), StoreError> {
        if self.contains(action.id()) {
            return Err(StoreError::Duplicate(action.id()));
        }
        self.settled.push(action);
        Ok(())
    }

    fn queued_for(&self, actor: PlayerId) -> Vec<&QueuedAction> {
        self.queued.iter().filter(|a| a.actor == actor).collect()
    }

    fn progressing_for(&self, actor: PlayerId) -> Vec<&ProgressingAction> {
        self.progressing
            .values()
            .filter(|a| a.actor() == actor)
            .collect()
    }

    fn settled_for(&self, actor: PlayerId) -> Vec<&SettledAction> {
        self.settled.iter().filter(|a| a.actor() == actor).collect()
    }

    fn find(&self, id: ActionId) -> Option<ActionRecord> {
        if let Some(a) = self.queued.iter().find(|a| a.id == id) {
            return Some(ActionRecord::Queued(a.clone()));
        }
        if let Some(a) = self.progressing.get(&id) {
            return Some(ActionRecord::Progressing(a.clone()));
        }
        self.settled
            .iter()
            .find(|a| a.id() == id)
            .map(|a| ActionRecord::Settled(a.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wargame_types::{
        ActionPayload, ActionStage, Coord, FailureReason, MoveGoods, TileId, Waypoint,
    };

    fn queued(actor: PlayerId) -> QueuedAction {
        let to = Waypoint::new(TileId::new(), Coord::new(1, 1));
        QueuedAction::new(
            actor,
            ActionPayload::MoveGoods(MoveGoods {
                from: TileId::new(),
                to: to.tile_id,
                good: "wood".to_owned(),
                quantity: 1,
                cost: 1,
                path: vec![to],
            }),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1100, 1, 1).unwrap()
    }

    #[test]
    fn only_owner_can_remove_queued() {
        let mut store = MemoryActionStore::new();
        let owner = PlayerId::new();
        let action = queued(owner);
        let id = action.id;
        store.enqueue(action).unwrap();

        assert_eq!(
            store.remove_queued(PlayerId::new(), id).unwrap_err(),
            StoreError::QueuedNotFound(id)
        );
        assert_eq!(store.remove_queued(owner, id).unwrap().id, id);
        assert!(store.find(id).is_none());
    }

    #[test]
    fn take_and_restore_keep_order() {
        let mut store = MemoryActionStore::new();
        let actor = PlayerId::new();
        let first = queued(actor);
        let second = queued(actor);
        let late = queued(actor);
        let ids = [first.id, second.id];
        store.enqueue(first).unwrap();
        store.enqueue(second).unwrap();

        let taken = store.take_queued();
        assert_eq!(taken.iter().map(|a| a.id).collect::<Vec<_>>(), ids);
        assert!(store.queued_for(actor).is_empty());

        let late_id = late.id;
        store.enqueue(late).unwrap();
        store.restore_queued(taken);
        let order: Vec<ActionId> = store.queued_for(actor).iter().map(|a| a.id).collect();
        assert_eq!(order, vec![ids[0], ids[1], late_id]);
    }

    #[test]
    fn stages_stay_disjoint() {
        let mut store = MemoryActionStore::new();
        let actor = PlayerId::new();
        let action = queued(actor);
        let id = action.id;
        store.enqueue(action.clone()).unwrap();

        // Still queued: cannot also be progressing.
        assert_eq!(
            store.insert_progressing(action.clone().accept()),
            Err(StoreError::Duplicate(id))
        );

        let action = store.take_queued().pop().unwrap();
        store.insert_progressing(action.accept()).unwrap();
        assert_eq!(store.find(id).map(|r| r.stage()), Some(ActionStage::Progressing));

        let progressing = store.take_progressing(id).unwrap();
        let location = Waypoint::new(TileId::new(), Coord::new(0, 0));
        store
            .settle(progressing.fail(FailureReason::GoodsLostInTransit, location, date()))
            .unwrap();
        assert_eq!(store.find(id).map(|r| r.stage()), Some(ActionStage::Settled));
        assert_eq!(store.settled_for(actor).len(), 1);
        assert_eq!(store.counts(), (0, 0, 1));
    }

    #[test]
    fn update_requires_existing_record() {
        let mut store = MemoryActionStore::new();
        let progressing = queued(PlayerId::new()).accept();
        let id = progressing.id();
        assert_eq!(
            store.update_progressing(progressing),
            Err(StoreError::ProgressingNotFound(id))
        );
    }
}
