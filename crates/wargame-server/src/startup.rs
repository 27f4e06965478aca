//! Background startup helper for the engine binary.
//!
//! [`spawn_server`] launches the API on its own Tokio task so the binary
//! can keep waiting for a shutdown signal.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use wargame_core::config::ServerConfig;

use crate::server::{ServerError, socket_addr, start_server};
use crate::state::AppState;

/// A running server task and the trigger that stops it.
#[derive(Debug)]
pub struct ServerHandle {
    /// The server task.
    pub task: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
}

impl ServerHandle {
    /// Ask the server to stop accepting connections and wait for it.
    pub async fn shutdown(self) {
        // The receiver is gone only if the task already exited.
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "API server task failed");
        }
    }
}

/// Spawn the API server on a background task.
///
/// The address is validated before spawning; bind failures after that are
/// logged by the task.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] for a malformed address.
pub fn spawn_server(config: ServerConfig, state: Arc<AppState>) -> Result<ServerHandle, ServerError> {
    let addr = socket_addr(&config)?;
    let (tx, rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = start_server(&config, state, shutdown).await {
            tracing::error!(error = %e, "API server exited with error");
        }
    });

    tracing::info!(%addr, "API server spawned on background task");
    Ok(ServerHandle { task, shutdown: tx })
}
