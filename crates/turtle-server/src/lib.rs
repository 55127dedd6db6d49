//! HTTP surface of Turtle Sync.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Update endpoints** (`GET /api`, `POST /api`) that validate a partial
//!   update, apply it to the caller's turtle and broadcast the result
//! - **Snapshot endpoint** (`GET /turtles`) returning recently active
//!   turtles as a JSON array
//! - **Push stream** (`GET /events`) delivering one server-sent event per
//!   update
//! - **Status page** (`GET /`) and a help page for everything else
//!
//! # Architecture
//!
//! Handlers share one [`AppState`] holding the
//! [`ActorRegistry`](turtle_core::ActorRegistry) and the
//! [`BroadcastHub`](turtle_core::BroadcastHub). Updates go through
//! [`UpdateIngress`](turtle_core::UpdateIngress), which publishes while
//! holding the actor's lock so each viewer sees one actor's events in
//! order.

pub mod error;
pub mod events;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, serve, start_server};
pub use state::AppState;
