//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How the most recent update for an actor reached the server.
///
/// Informational only: viewers use it to pick a status icon, the server
/// never branches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum UpdateMethod {
    /// Query-string update (`GET /api?x=..`).
    #[default]
    Get,
    /// JSON body update (`POST /api`).
    Post,
}

impl UpdateMethod {
    /// The HTTP method name as it appears on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// Parse a wire tag, ignoring case. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("GET") {
            Some(Self::Get)
        } else if tag.eq_ignore_ascii_case("POST") {
            Some(Self::Post)
        } else {
            None
        }
    }
}

impl core::fmt::Display for UpdateMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
