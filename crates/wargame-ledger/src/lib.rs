//! Goods bookkeeping for the Wargame turn engine.
//!
//! Every unit of a good on the map lives in exactly one place: a tile's
//! inventory ([`Stock`]), or a tile's in-transit ledger ([`TransitLedger`])
//! while a shipment is on the road. Quantities are unsigned and every
//! mutation goes through checked operations, so a negative or overflowed
//! quantity cannot be represented.
//!
//! # Modules
//!
//! - [`stock`] -- The [`Stock`] keyed-quantity map used for tile inventories.
//! - [`transit`] -- The per-actor [`TransitLedger`] carried by each tile.
//! - [`balance`] -- Checked debit and credit of player money.
//! - [`conservation`] -- Verification that a shipment hop moved goods
//!   without creating or destroying any.
//!
//! # Conservation Law
//!
//! For one actor, one good and one shipment hop between the previous and
//! the current waypoint:
//!
//! ```text
//! held_before + injected == held_after + absorbed
//! ```
//!
//! where `injected` is the quantity entering transit on the first hop and
//! `absorbed` is the quantity delivered into the destination inventory on
//! the last hop. A violation produces a [`LedgerAnomaly`].
//!
//! # Usage
//!
//! ```
//! use wargame_ledger::{Stock, TransitLedger};
//! use wargame_types::PlayerId;
//!
//! let actor = PlayerId::new();
//! let mut inventory = Stock::new();
//! inventory.add("wood", 50).ok();
//!
//! // Ship 20 wood out of the tile.
//! inventory.remove("wood", 20).ok();
//! let mut ledger = TransitLedger::new();
//! ledger.deposit(actor, "wood", 20).ok();
//!
//! assert_eq!(inventory.quantity("wood"), 30);
//! assert_eq!(ledger.held(actor, "wood"), 20);
//! ```

pub mod balance;
pub mod conservation;
pub mod stock;
pub mod transit;

// Re-export primary types at crate root.
pub use conservation::{ConservationResult, HopTotals};
pub use stock::Stock;
pub use transit::TransitLedger;

use wargame_types::PlayerId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when moving goods or money.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// An inventory held less of a good than was requested.
    #[error("insufficient {good}: requested {requested}, available {available}")]
    InsufficientQuantity {
        /// The good being removed.
        good: String,
        /// Units requested.
        requested: u64,
        /// Units actually held.
        available: u64,
    },

    /// A transit ledger held less for this actor than was requested.
    #[error(
        "insufficient {good} in transit for player {actor}: requested {requested}, available {available}"
    )]
    InsufficientInTransit {
        /// Owner of the shipment.
        actor: PlayerId,
        /// The good being withdrawn.
        good: String,
        /// Units requested.
        requested: u64,
        /// Units actually in transit.
        available: u64,
    },

    /// A balance did not cover a debit.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount requested.
        requested: u64,
        /// Current balance.
        available: u64,
    },

    /// A checked addition overflowed.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation violation detected while verifying a shipment hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Owner of the shipment.
    pub actor: PlayerId,
    /// The good being shipped.
    pub good: String,
    /// `held_before + injected`, or `None` if that sum overflowed.
    pub expected: Option<u64>,
    /// `held_after + absorbed`, or `None` if that sum overflowed.
    pub actual: Option<u64>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
