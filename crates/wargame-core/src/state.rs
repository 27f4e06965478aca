//! Everything a resolution cycle reads and writes, in one place.

use chrono::NaiveDate;

use wargame_world::{GoodsCatalog, WorldMap};

use crate::calendar::Calendar;
use crate::players::PlayerRegistry;
use crate::sessions::SessionTable;
use crate::store::{ActionStore, MemoryActionStore};

/// Shared game state.
///
/// The calendar starts out absent and is created at `epoch` by the first
/// resolution cycle.
#[derive(Debug, Clone)]
pub struct GameState<S: ActionStore = MemoryActionStore> {
    /// The tile grid.
    pub world: WorldMap,
    /// Known goods.
    pub catalog: GoodsCatalog,
    /// Registered players.
    pub players: PlayerRegistry,
    /// Action records in all stages.
    pub actions: S,
    /// Open sessions.
    pub sessions: SessionTable,
    /// The in-game date, once the first cycle has run.
    pub calendar: Option<Calendar>,
    /// Date a new calendar starts at.
    pub epoch: NaiveDate,
    /// Terrain cost a shipment may spend per turn.
    pub movement_budget: u32,
}

impl<S: ActionStore> GameState<S> {
    /// Assemble a state with no calendar and no sessions.
    pub const fn new(
        world: WorldMap,
        catalog: GoodsCatalog,
        players: PlayerRegistry,
        actions: S,
        epoch: NaiveDate,
        movement_budget: u32,
    ) -> Self {
        Self {
            world,
            catalog,
            players,
            actions,
            sessions: SessionTable::new(),
            calendar: None,
            epoch,
            movement_budget,
        }
    }

    /// The current date, or the epoch before the first cycle.
    pub fn current_date(&self) -> NaiveDate {
        self.calendar.map_or(self.epoch, |c| c.date())
    }

    /// The calendar, created at the epoch if it does not exist yet.
    pub fn ensure_calendar(&mut self) -> &mut Calendar {
        self.calendar.get_or_insert_with(|| Calendar::new(self.epoch))
    }
}
