//! HTTP server lifecycle management.
//!
//! Provides [`start_server`] which binds to a TCP port and runs the Axum
//! server until `Ctrl-C` is received, and [`serve`] which runs on an
//! already bound listener until [`AppState::shutdown`] is cancelled.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use turtle_core::config::ServerSection;

use crate::router::build_router;
use crate::state::AppState;

/// Start the HTTP server.
///
/// Binds to the configured address and serves requests until `Ctrl-C`.
/// The signal cancels the state's shutdown token, which ends open event
/// streams before the server drains its connections.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerSection, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Turtle server listening");

    let signal = tokio::spawn(cancel_on_ctrl_c(state.shutdown.clone()));
    let result = serve(listener, state).await;
    signal.abort();
    result
}

/// Serve on `listener` until the state's shutdown token is cancelled.
///
/// Peer addresses are recorded on every request so identity can fall
/// back to the socket address.
///
/// # Errors
///
/// Returns an error if the server encounters a fatal I/O error.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let shutdown = state.shutdown.clone();
    let router = build_router(state);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.cancelled_owned())
    .await
    .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Turtle server stopped");
    Ok(())
}

/// Cancel `shutdown` when the process receives `Ctrl-C`.
async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
