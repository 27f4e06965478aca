//! The async facade the server talks to.
//!
//! [`Game`] owns the [`GameState`] behind a [`RwLock`]. Reads share the
//! lock; submissions and cycles take it exclusively. A separate gate
//! serialises resolution cycles so a second operator call fails fast with
//! [`GameError::CycleInProgress`] instead of queueing behind the first.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use wargame_ledger::Stock;
use wargame_types::{ActionId, IntentRequest, PlayerId, SessionId, TileId};
use wargame_world::{
    GoodsCatalog, ReconcileReport, Route, Tile, WorldError, WorldParams, claim_starting_tiles,
    create_starting_world,
};

use crate::config::GameConfig;
use crate::intents::{self, ActionListing, IntentError};
use crate::operator::{OperatorState, OperatorStatus};
use crate::players::{NewPlayer, PlayerError, PlayerOverview, PlayerRegistry};
use crate::queries::{self, Ownership, QueryError};
use crate::resolution::{self, ResolutionError, ResolutionSummary};
use crate::sessions::Session;
use crate::state::GameState;
use crate::store::MemoryActionStore;

/// Errors surfaced by [`Game`].
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The session id is not open.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// The caller is not an operator.
    #[error("player {0} is not privileged")]
    NotPrivileged(PlayerId),

    /// Another cycle is running.
    #[error("a resolution cycle is already running")]
    CycleInProgress,

    /// The tile is not on the map.
    #[error("tile not found: {0}")]
    TileNotFound(TileId),

    /// Submission or removal refused.
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// A read-only query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A player operation failed.
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// A map or catalog operation failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The cycle could not run.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Shared handle to one running game.
#[derive(Debug)]
pub struct Game {
    name: String,
    state: RwLock<GameState>,
    cycle_gate: Mutex<()>,
    operator: OperatorState,
    starting_money: u64,
    privileged_names: BTreeSet<String>,
}

impl Game {
    /// Wrap an existing state.
    pub fn new(config: &GameConfig, state: GameState) -> Self {
        Self {
            name: config.world.name.clone(),
            state: RwLock::new(state),
            cycle_gate: Mutex::new(()),
            operator: OperatorState::new(),
            starting_money: config.economy.starting_money,
            privileged_names: config.operator.privileged.iter().cloned().collect(),
        }
    }

    /// Generate the starting world, register the configured players and
    /// give each non-privileged player a starting tile.
    ///
    /// # Errors
    ///
    /// Returns [`GameError`] if the catalog, map or a player entry is
    /// invalid.
    pub fn from_config(config: &GameConfig) -> Result<Self, GameError> {
        let mut catalog = GoodsCatalog::new();
        for good in &config.economy.goods {
            catalog.add(good)?;
        }
        let params = WorldParams {
            width: config.world.width,
            height: config.world.height,
            seed: config.world.seed,
            starting_stock: Stock::from(config.economy.starting_stock.clone()),
        };
        let mut world = create_starting_world(&params, &catalog)?;

        let mut players = PlayerRegistry::new();
        let mut claimants = Vec::new();
        for entry in &config.players {
            let privileged = config.is_privileged(&entry.display_name);
            let player = players.register(NewPlayer {
                display_name: entry.display_name.clone(),
                money: entry.money.unwrap_or(config.economy.starting_money),
                color: entry.color.clone(),
                privileged,
            })?;
            if !privileged {
                claimants.push(player.id);
            }
        }
        let claimed = claim_starting_tiles(&mut world, &claimants);
        if claimed.len() < claimants.len() {
            warn!(
                players = claimants.len(),
                claimed = claimed.len(),
                "not enough land for every player"
            );
        }

        let state = GameState::new(
            world,
            catalog,
            players,
            MemoryActionStore::new(),
            config.calendar.epoch,
            config.economy.movement_budget,
        );
        info!(
            game = %config.world.name,
            players = state.players.len(),
            tiles = state.world.tile_count(),
            "game ready"
        );
        Ok(Self::new(config, state))
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Open a session for `display_name`, registering the player with the
    /// starting balance if the name is new.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Player`] if a new name is invalid.
    pub async fn open_session(&self, display_name: &str) -> Result<Session, GameError> {
        let mut state = self.state.write().await;
        let player = match state.players.by_name(display_name) {
            Some(player) => player.id,
            None => {
                state
                    .players
                    .register(NewPlayer {
                        display_name: display_name.to_owned(),
                        money: self.starting_money,
                        color: None,
                        privileged: self.privileged_names.contains(display_name),
                    })?
                    .id
            }
        };
        let session = state.sessions.open(player);
        info!(session = %session.id, %player, "session opened");
        Ok(session)
    }

    /// The player behind an open session.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownSession`] if it is not open.
    pub async fn authenticate(&self, session: SessionId) -> Result<PlayerId, GameError> {
        self.state
            .read()
            .await
            .sessions
            .player_for(session)
            .ok_or(GameError::UnknownSession(session))
    }

    /// Close a session. Returns `true` if it was open.
    pub async fn close_session(&self, session: SessionId) -> bool {
        self.state.write().await.sessions.close(session)
    }

    // -----------------------------------------------------------------------
    // Player operations
    // -----------------------------------------------------------------------

    /// Queue an intent for `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Intent`] for a malformed request.
    pub async fn submit(&self, actor: PlayerId, request: IntentRequest) -> Result<ActionId, GameError> {
        let mut state = self.state.write().await;
        Ok(intents::submit_intent(&mut *state, actor, request)?)
    }

    /// Withdraw a queued intent.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Intent`] if it is not queued for `actor`.
    pub async fn remove(&self, actor: PlayerId, id: ActionId) -> Result<(), GameError> {
        let mut state = self.state.write().await;
        intents::remove_intent(&mut *state, actor, id)?;
        Ok(())
    }

    /// The caller's actions in every stage.
    pub async fn list(&self, actor: PlayerId) -> ActionListing {
        intents::list_actions(&*self.state.read().await, actor)
    }

    /// The caller's overview.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Query`] if `actor` is unknown.
    pub async fn overview(&self, actor: PlayerId) -> Result<PlayerOverview, GameError> {
        Ok(queries::player_overview(&*self.state.read().await, actor)?)
    }

    /// Whether `actor` owns `tile`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Query`] if the tile is unknown.
    pub async fn ownership(&self, actor: PlayerId, tile: TileId) -> Result<Ownership, GameError> {
        Ok(queries::check_ownership(&*self.state.read().await, actor, tile)?)
    }

    /// Plan a route between two tiles.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Query`] for unknown tiles or no route.
    pub async fn route(&self, from: TileId, to: TileId, budget: Option<u32>) -> Result<Route, GameError> {
        Ok(queries::compute_route(&*self.state.read().await, from, to, budget)?)
    }

    /// Every tile, in row-major order.
    pub async fn tiles(&self) -> Vec<Tile> {
        self.state.read().await.world.tiles_by_coord().cloned().collect()
    }

    /// One tile.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TileNotFound`] if it is not on the map.
    pub async fn tile(&self, id: TileId) -> Result<Tile, GameError> {
        self.state
            .read()
            .await
            .world
            .tile(id)
            .cloned()
            .ok_or(GameError::TileNotFound(id))
    }

    /// The current in-game date.
    pub async fn current_date(&self) -> NaiveDate {
        self.state.read().await.current_date()
    }

    /// Look up a player id by display name.
    pub async fn player_id(&self, display_name: &str) -> Option<PlayerId> {
        self.state
            .read()
            .await
            .players
            .by_name(display_name)
            .map(|p| p.id)
    }

    // -----------------------------------------------------------------------
    // Operator operations
    // -----------------------------------------------------------------------

    async fn require_privileged(&self, actor: PlayerId) -> Result<(), GameError> {
        if self.state.read().await.players.is_privileged(actor) {
            Ok(())
        } else {
            warn!(player = %actor, "operator call refused");
            Err(GameError::NotPrivileged(actor))
        }
    }

    /// Run one resolution cycle.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotPrivileged`] if `actor` is not an operator.
    /// - [`GameError::CycleInProgress`] if another cycle is running.
    /// - [`GameError::Resolution`] if the calendar cannot advance.
    pub async fn resolve(&self, actor: PlayerId, end_turn: bool) -> Result<ResolutionSummary, GameError> {
        self.require_privileged(actor).await?;
        let _gate = self
            .cycle_gate
            .try_lock()
            .map_err(|_e| GameError::CycleInProgress)?;

        self.operator.begin_cycle();
        let result = {
            let mut state = self.state.write().await;
            resolution::run_cycle(&mut *state, end_turn)
        };
        self.operator.end_cycle(result.is_ok()).await;
        info!(operator = %actor, end_turn, ok = result.is_ok(), "resolution requested");
        Ok(result?)
    }

    /// Add a good to the catalog and reconcile every tile.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotPrivileged`] or [`GameError::World`] for an
    /// invalid name.
    pub async fn add_good(&self, actor: PlayerId, name: &str) -> Result<ReconcileReport, GameError> {
        self.require_privileged(actor).await?;
        let mut state = self.state.write().await;
        let added = state.catalog.add(name)?;
        let GameState { world, catalog, .. } = &mut *state;
        let report = world.reconcile_goods(catalog);
        info!(good = name, added, entries_added = report.entries_added, "good added");
        Ok(report)
    }

    /// Remove a good from the catalog and reconcile every tile. Units of
    /// the good still on tiles are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotPrivileged`] or [`GameError::World`] if the
    /// good is not listed.
    pub async fn remove_good(&self, actor: PlayerId, name: &str) -> Result<ReconcileReport, GameError> {
        self.require_privileged(actor).await?;
        let mut state = self.state.write().await;
        state.catalog.remove(name)?;
        let GameState { world, catalog, .. } = &mut *state;
        let report = world.reconcile_goods(catalog);
        info!(
            good = name,
            entries_removed = report.entries_removed,
            units_discarded = report.units_discarded,
            "good removed"
        );
        Ok(report)
    }

    /// Current operator status. Does not wait for a running cycle's
    /// counters, but does wait for the state lock.
    pub async fn status(&self) -> OperatorStatus {
        let (current_date, open_sessions, players) = {
            let state = self.state.read().await;
            (state.current_date(), state.sessions.len(), state.players.len())
        };
        OperatorStatus {
            game: self.name.clone(),
            cycles_run: self.operator.cycles_run(),
            current_date,
            cycle_in_flight: self.operator.is_in_flight(),
            last_cycle_at: self.operator.last_cycle_at().await,
            started_at: self.operator.started_at(),
            open_sessions: u64::try_from(open_sessions).unwrap_or(u64::MAX),
            players: u64::try_from(players).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::parse(
            r"
world:
  seed: 7
  width: 6
  height: 5
players:
  - display_name: operator
  - display_name: red
    money: 40
",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn from_config_seeds_players_and_tiles() {
        let game = Game::from_config(&config()).unwrap();
        assert_eq!(game.tiles().await.len(), 30);

        let red = game.player_id("red").await.unwrap();
        let overview = game.overview(red).await.unwrap();
        assert_eq!(overview.money, 40);
        assert_eq!(overview.tiles_owned, 1);
        assert!(!overview.privileged);

        let op = game.player_id("operator").await.unwrap();
        let op_view = game.overview(op).await.unwrap();
        assert!(op_view.privileged);
        assert_eq!(op_view.tiles_owned, 0);
    }

    #[tokio::test]
    async fn open_session_registers_new_names() {
        let game = Game::from_config(&config()).unwrap();
        let session = game.open_session("green").await.unwrap();
        let green = game.authenticate(session.id).await.unwrap();
        assert_eq!(game.overview(green).await.unwrap().money, 100);

        let again = game.open_session("green").await.unwrap();
        assert_eq!(game.authenticate(again.id).await.unwrap(), green);
        assert!(game.open_session("").await.is_err());
    }

    #[tokio::test]
    async fn resolve_requires_privilege() {
        let game = Game::from_config(&config()).unwrap();
        let red = game.player_id("red").await.unwrap();
        assert!(matches!(
            game.resolve(red, false).await,
            Err(GameError::NotPrivileged(_))
        ));
        assert_eq!(game.status().await.cycles_run, 0);
    }

    #[tokio::test]
    async fn second_cycle_refused_while_one_runs() {
        let game = Game::from_config(&config()).unwrap();
        let operator = game.player_id("operator").await.unwrap();
        let before = game.current_date().await;

        let held = game.cycle_gate.lock().await;
        assert!(matches!(
            game.resolve(operator, false).await,
            Err(GameError::CycleInProgress)
        ));
        assert_eq!(game.status().await.cycles_run, 0);
        assert_eq!(game.current_date().await, before);
        drop(held);

        let summary = game.resolve(operator, false).await.unwrap();
        assert_eq!(summary.resolved_on, before);
        assert_eq!(game.status().await.cycles_run, 1);
    }

    #[tokio::test]
    async fn end_turn_closes_player_sessions() {
        let game = Game::from_config(&config()).unwrap();
        let op_session = game.open_session("operator").await.unwrap();
        let red_session = game.open_session("red").await.unwrap();
        let op = game.authenticate(op_session.id).await.unwrap();

        let summary = game.resolve(op, true).await.unwrap();
        assert_eq!(summary.sessions_terminated, 1);
        assert!(game.authenticate(op_session.id).await.is_ok());
        assert!(matches!(
            game.authenticate(red_session.id).await,
            Err(GameError::UnknownSession(_))
        ));

        let status = game.status().await;
        assert_eq!(status.cycles_run, 1);
        assert_eq!(
            status.current_date,
            NaiveDate::from_ymd_opt(1100, 1, 2).unwrap()
        );
        assert!(status.last_cycle_at.is_some());
    }

    #[tokio::test]
    async fn goods_catalog_changes_reach_every_tile() {
        let game = Game::from_config(&config()).unwrap();
        let op = game.player_id("operator").await.unwrap();

        let report = game.add_good(op, "salt").await.unwrap();
        assert_eq!(report.entries_added, 30);
        assert!(game.tiles().await.iter().all(|t| t.goods.lists("salt")));

        game.remove_good(op, "salt").await.unwrap();
        assert!(game.tiles().await.iter().all(|t| !t.goods.lists("salt")));
        assert!(matches!(
            game.remove_good(op, "salt").await,
            Err(GameError::World(WorldError::UnknownGood(_)))
        ));
    }
}
