//! Error types for the engine binary.

/// Startup failures.
///
/// `main` attaches context to these through `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: wargame_core::config::ConfigError,
    },

    /// Building the starting world or players failed.
    #[error("game setup error: {source}")]
    Game {
        /// The underlying game error.
        #[from]
        source: wargame_core::game::GameError,
    },

    /// The API server could not be started.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: wargame_server::ServerError,
    },

    /// The log filter or subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
