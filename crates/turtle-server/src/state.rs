//! Shared application state for the HTTP server.
//!
//! [`AppState`] owns the actor registry, the broadcast hub and the
//! shutdown token. They are created once at startup and injected into
//! handlers through Axum's `State` extractor; there is no process-global
//! state.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use turtle_core::{ActorRegistry, BroadcastHub, TurtleConfig, UpdateIngress};

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authoritative actor records.
    pub registry: Arc<ActorRegistry>,
    /// Push-stream subscribers.
    pub hub: Arc<BroadcastHub>,
    /// Validated apply-then-publish path shared by both update endpoints.
    pub ingress: UpdateIngress,
    /// Interval between SSE keep-alive comments.
    pub keep_alive: Duration,
    /// Cancelled once to stop serving. Open event streams end with it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build the state described by `config`.
    pub fn new(config: &TurtleConfig) -> Self {
        let registry = Arc::new(ActorRegistry::new(config.registry.recency_window()));
        let hub = Arc::new(BroadcastHub::new(config.broadcast.subscriber_capacity));
        Self {
            ingress: UpdateIngress::new(Arc::clone(&registry), Arc::clone(&hub)),
            registry,
            hub,
            keep_alive: config.broadcast.keep_alive(),
            shutdown: CancellationToken::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&TurtleConfig::default())
    }
}
