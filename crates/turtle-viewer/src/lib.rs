//! Turtle Sync viewer.
//!
//! Mirrors the server's actors locally and animates them between the
//! positions the server reports.
//!
//! # Architecture
//!
//! ```text
//! GET /turtles --+                       render tick
//!                +--> MirrorOp queue --> drain -> advance -> draw --> Canvas
//! GET /events ---+   (unbounded mpsc)    (Scene / ClientMirror)
//! ```
//!
//! - [`client`] fetches the snapshot and reads the push stream on its own
//!   task, enqueueing [`scheduler::MirrorOp`]s.
//! - [`scheduler::Scene`] owns the [`mirror::ClientMirror`] and applies
//!   queued operations at the start of each render tick.
//! - Each mirror entry walks legs with a [`motion::MotionInterpolator`],
//!   keeps a [`trail::Trail`] and plays an [`animator::Animator`].
//! - [`render::render`] draws everything through the [`render::Canvas`]
//!   trait.

pub mod animator;
pub mod client;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mirror;
pub mod motion;
pub mod render;
pub mod scheduler;
pub mod sse;
pub mod trail;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use mirror::ClientMirror;
pub use scheduler::Scene;
