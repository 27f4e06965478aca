//! Configuration loading and typed config structures for the Wargame engine.
//!
//! The canonical configuration lives in `wargame-config.yaml` at the
//! project root (path overridable with `WARGAME_CONFIG`). Every section and
//! field has a default, so an empty or missing file yields a playable game.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "wargame-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `wargame-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Map generation settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Calendar settings.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Money, movement and goods.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level and format.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Privileged players.
    #[serde(default)]
    pub operator: OperatorConfig,

    /// Players registered at startup.
    #[serde(default = "default_players")]
    pub players: Vec<PlayerConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            calendar: CalendarConfig::default(),
            economy: EconomyConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            operator: OperatorConfig::default(),
            players: default_players(),
        }
    }
}

impl GameConfig {
    /// Load configuration from the path in `WARGAME_CONFIG`, or
    /// [`DEFAULT_CONFIG_PATH`] when unset. A missing file yields defaults.
    ///
    /// Environment overrides are applied and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if the resulting values are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WARGAME_CONFIG")
            .map_or_else(|_e| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        if path.exists() {
            Self::from_file(&path)
        } else {
            let mut config = Self::default();
            config.server.apply_env_overrides()?;
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `WARGAME_HOST` overrides `server.host`
    /// - `WARGAME_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.server.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.world.width == 0 || self.world.height == 0 {
            return invalid("world.width and world.height must be at least 1");
        }
        if self.economy.movement_budget == 0 {
            return invalid("economy.movement_budget must be at least 1");
        }
        if let Some(good) = self
            .economy
            .starting_stock
            .keys()
            .find(|g| !self.economy.goods.contains(g))
        {
            return Err(ConfigError::Invalid {
                reason: format!("economy.starting_stock lists {good}, which is not in economy.goods"),
            });
        }
        Ok(())
    }

    /// Whether the named player is privileged.
    pub fn is_privileged(&self, display_name: &str) -> bool {
        self.operator
            .privileged
            .iter()
            .any(|name| name == display_name)
    }
}

/// Map generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable game name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// RNG seed for terrain and population.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Columns.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Rows.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Calendar settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarConfig {
    /// Date the calendar starts at when first created.
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
        }
    }
}

/// Money, movement and goods.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Balance of a newly registered player.
    #[serde(default = "default_starting_money")]
    pub starting_money: u64,

    /// Terrain cost a shipment may spend per turn.
    #[serde(default = "default_movement_budget")]
    pub movement_budget: u32,

    /// Initial goods catalog.
    #[serde(default = "default_goods")]
    pub goods: Vec<String>,

    /// Units of each good placed on every land tile.
    #[serde(default = "default_starting_stock")]
    pub starting_stock: BTreeMap<String, u64>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: default_starting_money(),
            movement_budget: default_movement_budget(),
            goods: default_goods(),
            starting_stock: default_starting_stock(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Override host and port with `WARGAME_HOST` / `WARGAME_PORT` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `WARGAME_PORT` is not a port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("WARGAME_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("WARGAME_PORT") {
            self.port = val.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("WARGAME_PORT={val}: {e}"),
            })?;
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Operator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperatorConfig {
    /// Display names of privileged players.
    #[serde(default = "default_privileged")]
    pub privileged: Vec<String>,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            privileged: default_privileged(),
        }
    }
}

/// A player registered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// Unique display name.
    pub display_name: String,

    /// Starting balance; `economy.starting_money` when absent.
    #[serde(default)]
    pub money: Option<u64>,

    /// Map colour as `#rrggbb`; random when absent.
    #[serde(default)]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Wargame".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_width() -> u32 {
    16
}

const fn default_height() -> u32 {
    12
}

fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1100, 1, 1).unwrap_or(NaiveDate::MIN)
}

const fn default_starting_money() -> u64 {
    100
}

const fn default_movement_budget() -> u32 {
    2
}

fn default_goods() -> Vec<String> {
    ["wood", "stone", "iron", "grain"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_starting_stock() -> BTreeMap<String, u64> {
    [("wood".to_owned(), 50), ("grain".to_owned(), 20)]
        .into_iter()
        .collect()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_privileged() -> Vec<String> {
    vec!["operator".to_owned()]
}

fn default_players() -> Vec<PlayerConfig> {
    ["operator", "red", "blue"]
        .into_iter()
        .map(|name| PlayerConfig {
            display_name: name.to_owned(),
            money: None,
            color: None,
        })
        .collect()
}
