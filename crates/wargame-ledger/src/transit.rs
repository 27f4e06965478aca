//! The per-tile moving-goods ledger.
//!
//! Each tile carries one [`TransitLedger`] recording, per actor, the goods
//! currently passing through it. Entries that reach zero are removed, and
//! an actor with no remaining goods is removed too, so the ledger never
//! holds stale zero entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wargame_types::PlayerId;

use crate::LedgerError;
use crate::stock::Stock;

/// Goods in transit through a tile, keyed by the owning actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitLedger(BTreeMap<PlayerId, Stock>);

impl TransitLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Units of `good` in transit for `actor`. Absent entries read as zero.
    pub fn held(&self, actor: PlayerId, good: &str) -> u64 {
        self.0.get(&actor).map_or(0, |stock| stock.quantity(good))
    }

    /// Record `amount` more units of `good` in transit for `actor`.
    /// Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] on overflow. The ledger
    /// is unchanged on error.
    pub fn deposit(&mut self, actor: PlayerId, good: &str, amount: u64) -> Result<u64, LedgerError> {
        let current = self.held(actor, good);
        let next = current
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("transit quantity overflow"))?;
        if next == 0 {
            return Ok(0);
        }
        self.0.entry(actor).or_default().add(good, amount)
    }

    /// Take `amount` units of `good` out of transit for `actor`. Returns
    /// the quantity left behind.
    ///
    /// Entries reaching zero are removed, and the actor is removed once it
    /// has nothing left in transit here.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientInTransit`] if fewer than
    /// `amount` units are held. The ledger is unchanged on error.
    pub fn withdraw(&mut self, actor: PlayerId, good: &str, amount: u64) -> Result<u64, LedgerError> {
        let available = self.held(actor, good);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::InsufficientInTransit {
                    actor,
                    good: good.to_owned(),
                    requested: amount,
                    available,
                })?;

        if let Some(stock) = self.0.get_mut(&actor) {
            stock.remove(good, amount)?;
            stock.prune_zeros();
            if stock.is_empty() {
                self.0.remove(&actor);
            }
        }
        Ok(remaining)
    }

    /// Everything `actor` has in transit here.
    pub fn goods_of(&self, actor: PlayerId) -> Option<&Stock> {
        self.0.get(&actor)
    }

    /// Whether `actor` has anything in transit here.
    pub fn has_actor(&self, actor: PlayerId) -> bool {
        self.0.contains_key(&actor)
    }

    /// Whether nothing is in transit through this tile.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(actor, goods)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &Stock)> {
        self.0.iter().map(|(actor, stock)| (*actor, stock))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn deposit_then_withdraw_removes_entry() {
        let actor = PlayerId::new();
        let mut ledger = TransitLedger::new();
        assert_eq!(ledger.deposit(actor, "wood", 20).unwrap(), 20);
        assert_eq!(ledger.held(actor, "wood"), 20);

        assert_eq!(ledger.withdraw(actor, "wood", 20).unwrap(), 0);
        assert!(!ledger.has_actor(actor));
        assert!(ledger.is_empty());
    }

    #[test]
    fn partial_withdraw_keeps_remainder() {
        let actor = PlayerId::new();
        let mut ledger = TransitLedger::new();
        ledger.deposit(actor, "wood", 20).unwrap();
        ledger.deposit(actor, "iron", 3).unwrap();

        assert_eq!(ledger.withdraw(actor, "wood", 5).unwrap(), 15);
        assert_eq!(ledger.withdraw(actor, "iron", 3).unwrap(), 0);
        let goods = ledger.goods_of(actor).unwrap();
        assert_eq!(goods.quantity("wood"), 15);
        assert!(!goods.lists("iron"));
    }

    #[test]
    fn withdraw_more_than_held_fails_without_change() {
        let actor = PlayerId::new();
        let mut ledger = TransitLedger::new();
        ledger.deposit(actor, "wood", 4).unwrap();

        let err = ledger.withdraw(actor, "wood", 5).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientInTransit {
                requested: 5,
                available: 4,
                ..
            }
        ));
        assert_eq!(ledger.held(actor, "wood"), 4);
    }

    #[test]
    fn actors_are_kept_apart() {
        let alice = PlayerId::new();
        let bob = PlayerId::new();
        let mut ledger = TransitLedger::new();
        ledger.deposit(alice, "wood", 10).unwrap();
        ledger.deposit(bob, "wood", 7).unwrap();

        assert!(ledger.withdraw(bob, "wood", 10).is_err());
        assert_eq!(ledger.held(alice, "wood"), 10);
        assert_eq!(ledger.iter().count(), 2);
    }

    #[test]
    fn zero_deposit_creates_nothing() {
        let actor = PlayerId::new();
        let mut ledger = TransitLedger::new();
        assert_eq!(ledger.deposit(actor, "wood", 0).unwrap(), 0);
        assert!(ledger.is_empty());
    }
}
