//! Keyed goods quantities for tile inventories.
//!
//! A [`Stock`] maps a good name to a non-negative unit count. Reads treat
//! an absent key and a zero entry identically. Zero entries are retained
//! by [`Stock::remove`] so that catalog goods stay listed on every tile;
//! [`Stock::prune_zeros`] drops them when a compact map is wanted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// A mapping from good name to quantity held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stock(BTreeMap<String, u64>);

impl Stock {
    /// Create an empty stock.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Units of `good` held. Absent goods read as zero.
    pub fn quantity(&self, good: &str) -> u64 {
        self.0.get(good).copied().unwrap_or(0)
    }

    /// Whether at least `amount` units of `good` are held.
    pub fn has_at_least(&self, good: &str, amount: u64) -> bool {
        self.quantity(good) >= amount
    }

    /// Whether `good` has an entry, zero or not.
    pub fn lists(&self, good: &str) -> bool {
        self.0.contains_key(good)
    }

    /// Add `amount` units of `good`. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if the quantity would
    /// exceed `u64::MAX`. The stock is unchanged on error.
    pub fn add(&mut self, good: &str, amount: u64) -> Result<u64, LedgerError> {
        let current = self.quantity(good);
        let next = current
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("stock quantity overflow"))?;
        self.0.insert(good.to_owned(), next);
        Ok(next)
    }

    /// Remove `amount` units of `good`. Returns the remaining quantity.
    ///
    /// The key is kept at zero rather than removed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientQuantity`] if fewer than `amount`
    /// units are held. The stock is unchanged on error.
    pub fn remove(&mut self, good: &str, amount: u64) -> Result<u64, LedgerError> {
        let available = self.quantity(good);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::InsufficientQuantity {
                    good: good.to_owned(),
                    requested: amount,
                    available,
                })?;
        self.0.insert(good.to_owned(), remaining);
        Ok(remaining)
    }

    /// Insert a zero entry for `good` if it has none. Returns `true` if an
    /// entry was inserted.
    pub fn list(&mut self, good: &str) -> bool {
        if self.lists(good) {
            return false;
        }
        self.0.insert(good.to_owned(), 0);
        true
    }

    /// Drop the entry for `good` entirely. Returns the quantity that was
    /// held, if any.
    pub fn delist(&mut self, good: &str) -> Option<u64> {
        self.0.remove(good)
    }

    /// Drop every zero entry.
    pub fn prune_zeros(&mut self) {
        self.0.retain(|_, qty| *qty > 0);
    }

    /// Sum of all quantities, or `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.0.values().try_fold(0_u64, |acc, qty| acc.checked_add(*qty))
    }

    /// Whether the stock has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every entry is zero (or there are none).
    pub fn is_depleted(&self) -> bool {
        self.0.values().all(|qty| *qty == 0)
    }

    /// Iterate over `(good, quantity)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(good, qty)| (good.as_str(), *qty))
    }
}

impl From<BTreeMap<String, u64>> for Stock {
    fn from(map: BTreeMap<String, u64>) -> Self {
        Self(map)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Stock {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(good, qty)| (good.into(), qty)).collect())
    }
}
