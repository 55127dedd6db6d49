//! Shared type definitions for Turtle Sync.
//!
//! This crate holds the wire contract between the server and its viewers.
//! Types flow downstream to `TypeScript` via `ts-rs` for browser viewers.
//!
//! # Modules
//!
//! - [`ids`] -- Actor and subscriber identifiers
//! - [`enums`] -- Update method tag
//! - [`structs`] -- Actor record and partial-update patch
//! - [`lenient`] -- Saturating decoders for untrusted records

pub mod enums;
pub mod ids;
pub mod lenient;
pub mod structs;

pub use enums::UpdateMethod;
pub use ids::{ActorId, SubscriberId};
pub use structs::{ActorPatch, ActorRecord, DEFAULT_COLOR, DEFAULT_WEIGHT, Rgb};
