//! Engine binary for the Wargame turn engine.
//!
//! Loads configuration, builds the starting world and players, and serves
//! the player and operator API until interrupted. Turns advance only when
//! an operator calls the resolve endpoint.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `wargame-config.yaml` (or `WARGAME_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Generate the starting world and register configured players
//! 4. Spawn the API server
//! 5. Wait for Ctrl-C, then shut the server down

mod error;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wargame_core::config::{GameConfig, LoggingConfig};
use wargame_core::game::Game;
use wargame_server::{AppState, spawn_server};

use crate::error::EngineError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration.
    let config = GameConfig::load()
        .map_err(EngineError::from)
        .context("loading configuration")?;

    // 2. Logging.
    init_logging(&config.logging).context("installing log subscriber")?;
    info!(
        game = %config.world.name,
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        movement_budget = config.economy.movement_budget,
        "wargame-engine starting"
    );

    // 3. World and players.
    let game = Game::from_config(&config)
        .map_err(EngineError::from)
        .context("building starting world")?;
    let app_state = Arc::new(AppState::new(Arc::new(game)));

    // 4. API server.
    let server = spawn_server(config.server.clone(), app_state)
        .map_err(EngineError::from)
        .context("starting API server")?;

    // 5. Run until interrupted.
    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown requested");
    server.shutdown().await;
    info!("wargame-engine shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_e| EnvFilter::try_new(&config.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter {:?}: {e}", config.level),
        })?;

    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}
