//! The global catalog of tradeable goods.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// The set of good names known to the game.
///
/// Changing the catalog does not touch any tile. Callers follow a change
/// with [`WorldMap::reconcile_goods`](crate::WorldMap::reconcile_goods).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodsCatalog(BTreeSet<String>);

impl GoodsCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Add a good. Returns `true` if it was not already listed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGoodName`] for an empty name or one
    /// with surrounding whitespace.
    pub fn add(&mut self, name: &str) -> Result<bool, WorldError> {
        if name.is_empty() || name.trim() != name {
            return Err(WorldError::InvalidGoodName(name.to_owned()));
        }
        Ok(self.0.insert(name.to_owned()))
    }

    /// Remove a good.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownGood`] if the good is not listed.
    pub fn remove(&mut self, name: &str) -> Result<(), WorldError> {
        if self.0.remove(name) {
            Ok(())
        } else {
            Err(WorldError::UnknownGood(name.to_owned()))
        }
    }

    /// Whether `name` is listed.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Listed goods in name order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of listed goods.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no goods are listed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for GoodsCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
