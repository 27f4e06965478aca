//! Conservation verification for shipment hops.
//!
//! A hop moves one actor's in-transit quantity of one good from the
//! previous waypoint's ledger into the current waypoint's ledger. Goods
//! may enter transit on the first hop (drained from the source inventory)
//! and leave it on the last hop (absorbed into the destination inventory).
//! Everything else must balance:
//!
//! ```text
//! held_before + injected == held_after + absorbed
//! ```
//!
//! `held_*` is the actor's quantity summed over the previous and current
//! tile (counted once when they are the same tile).

use tracing::warn;

use wargame_types::PlayerId;

use crate::LedgerAnomaly;

/// The result of a conservation check for a single hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// The hop moved goods without creating or destroying any.
    Balanced,
    /// The totals do not match.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// In-transit totals observed around one hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopTotals {
    /// Owner of the shipment.
    pub actor: PlayerId,
    /// The good being shipped.
    pub good: String,
    /// Quantity held across the previous and current tile before the hop.
    pub held_before: u64,
    /// Quantity held across the previous and current tile after the hop.
    pub held_after: u64,
    /// Quantity entering transit during the hop.
    pub injected: u64,
    /// Quantity leaving transit into an inventory during the hop.
    pub absorbed: u64,
}

/// Verify that a hop conserved the actor's in-transit goods.
pub fn verify_hop(totals: &HopTotals) -> ConservationResult {
    let expected = totals.held_before.checked_add(totals.injected);
    let actual = totals.held_after.checked_add(totals.absorbed);

    match (expected, actual) {
        (Some(e), Some(a)) if e == a => ConservationResult::Balanced,
        _ => {
            let message = format!(
                "LEDGER_ANOMALY: {good} in transit for player {actor} not conserved (expected {expected:?}, found {actual:?})",
                good = totals.good,
                actor = totals.actor,
            );
            warn!(
                actor = %totals.actor,
                good = %totals.good,
                ?expected,
                ?actual,
                "transit conservation violated"
            );
            ConservationResult::Anomaly(LedgerAnomaly {
                actor: totals.actor,
                good: totals.good.clone(),
                expected,
                actual,
                message,
            })
        }
    }
}
