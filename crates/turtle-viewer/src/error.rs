//! Error types for the viewer.
//!
//! Uses `thiserror` for typed errors covering configuration, the HTTP
//! snapshot fetch, the push stream, payload decoding and sprite metadata.

/// Errors that can occur while running the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The snapshot request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The event stream could not be opened or broke mid-read.
    #[error("event stream error: {0}")]
    Stream(String),

    /// A payload could not be decoded into an actor record.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A sprite file name does not describe a frame grid.
    #[error("sprite layout error: {0}")]
    Sprite(String),

    /// The render loop stopped accepting mirror operations.
    #[error("mirror operation queue closed")]
    QueueClosed,
}
