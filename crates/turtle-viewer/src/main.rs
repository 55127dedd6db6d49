//! Headless viewer entry point.
//!
//! Connects to a turtle server, mirrors its actors and runs the render
//! loop against a recording canvas, logging frame statistics once per
//! second. A windowed front end plugs in by supplying its own canvas.

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use turtle_viewer::client::{TurtleClient, run_ingestion};
use turtle_viewer::render::RecordingCanvas;
use turtle_viewer::scheduler::op_channel;
use turtle_viewer::{ClientMirror, Scene, ViewerConfig};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration or sprite name is invalid.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("turtle-viewer starting");

    let config = ViewerConfig::from_env()?;
    let settings = config.mirror_settings()?;
    info!(
        server_url = %config.server_url,
        tick_rate = config.tick_rate,
        motion_step = config.motion_step,
        animation_fps = config.animation_fps,
        ticks_per_frame = settings.ticks_per_frame,
        "configuration loaded"
    );

    let (ops, rx) = op_channel();
    let client = TurtleClient::new(config.server_url.clone());
    let ingestion = tokio::spawn(run_ingestion(client, ops, config.reconnect_delay));

    let mut scene = Scene::new(ClientMirror::new(settings), rx);
    let mut canvas = RecordingCanvas::default();
    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let report_every = u64::from(config.tick_rate);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = scene.step(&mut canvas);
                if report.applied > 0 {
                    debug!(tick = report.tick, applied = report.applied, "Mirror updated");
                }
                if report.tick.checked_rem(report_every) == Some(0) {
                    info!(
                        tick = report.tick,
                        actors = scene.mirror().len(),
                        moving = report.moving,
                        lines = canvas.line_count(),
                        sprites = canvas.sprite_count(),
                        "frame"
                    );
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    ingestion.abort();
    info!("turtle-viewer stopped");
    Ok(())
}
