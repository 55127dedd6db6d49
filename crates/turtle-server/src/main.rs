//! Turtle Sync server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `turtle-config.yaml` (or `$TURTLE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the actor registry and broadcast hub
//! 4. Serve HTTP until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use turtle_core::TurtleConfig;
use turtle_core::config::LoggingConfig;
use turtle_server::AppState;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "turtle-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the server fails
/// to bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var("TURTLE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = TurtleConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);

    info!("turtle-server starting");
    info!(
        config_path = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        recency_window_secs = config.registry.recency_window_secs,
        subscriber_capacity = config.broadcast.subscriber_capacity,
        "Configuration loaded"
    );

    // 3. Shared state.
    let state = Arc::new(AppState::new(&config));

    // 4. Serve.
    turtle_server::start_server(&config.server, state).await?;

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
