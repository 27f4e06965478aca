//! HTTP server lifecycle.
//!
//! [`start_server`] binds the listener and serves the router until the
//! supplied shutdown future completes.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use wargame_core::config::ServerConfig;

use crate::router::build_router;
use crate::state::AppState;

/// Errors from starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The address is malformed or cannot be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server hit a fatal I/O error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Parse the configured host and port into a socket address.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] for a malformed address.
pub fn socket_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address {}:{}: {e}", config.host, config.port)))
}

/// Serve the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError`] if the listener cannot bind or serving fails.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = socket_addr(config)?;
    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

    info!("API server stopped");
    Ok(())
}
