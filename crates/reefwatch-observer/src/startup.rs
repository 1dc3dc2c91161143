//! Observer server startup helper for embedding in the engine.
//!
//! [`spawn_observer`] launches the Observer HTTP + `WebSocket` server on a
//! background Tokio task so the API runs concurrently with the refresh
//! loop.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The server runs until the runtime shuts down or the returned task is
/// aborted.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address is invalid.
/// This is checked before the background task is spawned; bind failures
/// inside the task are logged.
pub fn spawn_observer(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = config.socket_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok(handle)
}
