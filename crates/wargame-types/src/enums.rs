//! Enumeration types for the Wargame turn engine.
//!
//! Terrain kinds, action kinds and the machine-readable failure reasons
//! recorded on settled actions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// The terrain of a single map tile.
///
/// Each terrain kind has a fixed traversal cost (see
/// `wargame_world::terrain::traversal_cost`). City, plains and fields are
/// the cheapest to cross; water is the most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Terrain {
    /// Open grassland.
    Plains,
    /// Mountain range.
    Mountains,
    /// Woodland.
    Forest,
    /// Cultivated farmland.
    Fields,
    /// Lakes, rivers and sea.
    Water,
    /// Settled urban tile.
    City,
}

impl Terrain {
    /// Every terrain kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Plains,
        Self::Mountains,
        Self::Forest,
        Self::Fields,
        Self::Water,
        Self::City,
    ];

    /// The lowercase name used in payloads and configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plains => "plains",
            Self::Mountains => "mountains",
            Self::Forest => "forest",
            Self::Fields => "fields",
            Self::Water => "water",
            Self::City => "city",
        }
    }
}

impl core::fmt::Display for Terrain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a terrain name is not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTerrain(pub String);

impl core::fmt::Display for UnknownTerrain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown terrain: {}", self.0)
    }
}

impl std::error::Error for UnknownTerrain {}

impl core::str::FromStr for Terrain {
    type Err = UnknownTerrain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTerrain(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The kind of an actor-submitted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// Ship goods from one tile to another along a multi-turn route.
    MoveGoods,
}

/// Why an action settled as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FailureReason {
    /// The source tile held less of the good than requested.
    NotEnoughGoods,
    /// The actor's balance did not cover the stated cost.
    NotEnoughMoney,
    /// The in-transit ledger no longer held the shipment.
    GoodsLostInTransit,
    /// The action carried an empty route.
    NoRoute,
    /// A tile referenced by the action is not on the map.
    UnknownTile,
}

impl FailureReason {
    /// Human-readable reason string shown to players.
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotEnoughGoods => "not enough goods",
            Self::NotEnoughMoney => "not enough money",
            Self::GoodsLostInTransit => "goods lost in transit",
            Self::NoRoute => "no route",
            Self::UnknownTile => "unknown tile",
        }
    }
}

impl core::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}
