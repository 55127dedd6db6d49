//! Identifier types for actors and push-stream subscribers.
//!
//! Actors are keyed by the network origin of the client that drives them,
//! so an [`ActorId`] wraps the textual IPv4 address rather than a generated
//! value. Two clients behind the same NAT or proxy share one actor; this is
//! an accepted limitation of address-derived identity.
//!
//! Subscribers are server-local and short-lived, so they get time-ordered
//! UUID v7 values.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Identity of one turtle, derived from the client's IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct ActorId(String);

impl ActorId {
    /// Wrap an identity string as received on the wire.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Ipv4Addr> for ActorId {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr.to_string())
    }
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one push-stream subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
