//! Server-side core of Turtle Sync.
//!
//! - [`registry`] -- authoritative actor records with per-actor locking
//! - [`broadcast`] -- best-effort fan-out of records to push subscribers
//! - [`ingress`] -- validation and the apply-then-publish update path
//! - [`identity`] -- network-address-derived actor identity
//! - [`config`] -- typed YAML configuration
//!
//! Nothing here is global: the server builds one [`ActorRegistry`] and one
//! [`BroadcastHub`], wraps them in [`Arc`](std::sync::Arc) and passes them
//! to [`UpdateIngress`] and the HTTP handlers.

pub mod broadcast;
pub mod config;
pub mod identity;
pub mod ingress;
pub mod registry;

pub use broadcast::{BroadcastHub, Subscription};
pub use config::{ConfigError, TurtleConfig};
pub use identity::{IdentityError, RequestOrigin};
pub use ingress::{FieldError, IngressError, IngressOutcome, TurtleUpdate, UpdateIngress};
pub use registry::ActorRegistry;
