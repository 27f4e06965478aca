//! The player registry.
//!
//! Players are keyed by [`PlayerId`]; display names are unique and act as
//! the login handle when a session is opened.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use wargame_ledger::balance;
use wargame_types::{Player, PlayerId};

/// Errors from player registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    /// The display name is taken.
    #[error("display name already registered: {0}")]
    NameTaken(String),

    /// The display name is empty or padded with whitespace.
    #[error("invalid display name: {0:?}")]
    InvalidName(String),

    /// The colour is not `#rrggbb`.
    #[error("invalid colour: {0:?}")]
    InvalidColor(String),

    /// No such player.
    #[error("player not found: {0}")]
    NotFound(PlayerId),

    /// A balance operation failed.
    #[error(transparent)]
    Ledger(#[from] wargame_ledger::LedgerError),
}

/// Inputs for [`PlayerRegistry::register`].
#[derive(Debug, Clone)]
pub struct NewPlayer {
    /// Unique display name.
    pub display_name: String,
    /// Starting balance.
    pub money: u64,
    /// Map colour; random when `None`.
    pub color: Option<String>,
    /// Whether the player is an operator.
    pub privileged: bool,
}

/// Summary shown to a player about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerOverview {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub display_name: String,
    /// Current balance.
    pub money: u64,
    /// Map colour.
    pub color: String,
    /// Whether the player is an operator.
    pub privileged: bool,
    /// Number of tiles owned.
    pub tiles_owned: u64,
    /// Population across owned tiles.
    pub population: u64,
}

/// All registered players.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, Player>,
    by_name: BTreeMap<String, PlayerId>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            by_name: BTreeMap::new(),
        }
    }

    /// Register a player and return their record.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError`] if the name is invalid or taken, or if an
    /// explicit colour is malformed.
    pub fn register(&mut self, new: NewPlayer) -> Result<&Player, PlayerError> {
        let name = new.display_name;
        if name.is_empty() || name.trim() != name {
            return Err(PlayerError::InvalidName(name));
        }
        if self.by_name.contains_key(&name) {
            return Err(PlayerError::NameTaken(name));
        }
        let color = match new.color {
            Some(c) if is_hex_color(&c) => c,
            Some(c) => return Err(PlayerError::InvalidColor(c)),
            None => random_color(),
        };

        let player = Player {
            id: PlayerId::new(),
            display_name: name.clone(),
            money: new.money,
            color,
            privileged: new.privileged,
        };
        let id = player.id;
        info!(
            player = %id,
            name = %player.display_name,
            privileged = player.privileged,
            "player registered"
        );
        self.by_name.insert(name, id);
        Ok(self.players.entry(id).or_insert(player))
    }

    /// Look up a player.
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Look up a player by display name.
    pub fn by_name(&self, display_name: &str) -> Option<&Player> {
        self.by_name
            .get(display_name)
            .and_then(|id| self.players.get(id))
    }

    /// Whether the player exists and is privileged.
    pub fn is_privileged(&self, id: PlayerId) -> bool {
        self.players.get(&id).is_some_and(|p| p.privileged)
    }

    /// Current balance.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::NotFound`] for an unknown player.
    pub fn balance(&self, id: PlayerId) -> Result<u64, PlayerError> {
        self.players
            .get(&id)
            .map(|p| p.money)
            .ok_or(PlayerError::NotFound(id))
    }

    /// Subtract `amount` from a player's balance. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::NotFound`] for an unknown player or
    /// [`PlayerError::Ledger`] if the balance does not cover the amount.
    pub fn debit(&mut self, id: PlayerId, amount: u64) -> Result<u64, PlayerError> {
        let player = self.players.get_mut(&id).ok_or(PlayerError::NotFound(id))?;
        player.money = balance::debit(player.money, amount)?;
        Ok(player.money)
    }

    /// Add `amount` back to a player's balance. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::NotFound`] for an unknown player or
    /// [`PlayerError::Ledger`] on overflow.
    pub fn credit(&mut self, id: PlayerId, amount: u64) -> Result<u64, PlayerError> {
        let player = self.players.get_mut(&id).ok_or(PlayerError::NotFound(id))?;
        player.money = balance::credit(player.money, amount)?;
        Ok(player.money)
    }

    /// Iterate over players in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are registered.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// A random `#rrggbb` colour.
fn random_color() -> String {
    let value: u32 = rand::rng().random_range(0..=0x00FF_FFFF);
    format!("#{value:06x}")
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s.chars().skip(1).all(|c| c.is_ascii_hexdigit())
}
