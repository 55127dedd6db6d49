//! Actor record and partial-update types.
//!
//! [`ActorRecord`] is the single wire contract between the server and every
//! viewer: the snapshot endpoint returns an array of them and the push
//! stream carries one per event. [`ActorPatch`] is the already-validated
//! partial update applied to a record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::UpdateMethod;
use crate::ids::ActorId;
use crate::lenient;

/// Stroke weight given to a freshly created actor.
pub const DEFAULT_WEIGHT: u16 = 3;

/// Line color given to a freshly created actor.
pub const DEFAULT_COLOR: Rgb = Rgb::new(255, 255, 255);

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

/// An 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ---------------------------------------------------------------------------
// ActorRecord
// ---------------------------------------------------------------------------

/// Server-authoritative state of one turtle.
///
/// `x`/`y` hold the most recently requested destination, which viewers
/// may not have reached yet. Field names on the wire are camelCase
/// (`clientIp`, `updatedAt`) to stay compatible with browser viewers.
///
/// Decoding is lenient (see [`lenient`]): numbers outside a field's type
/// saturate and unknown method tags decode as [`UpdateMethod::Get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActorRecord {
    /// Identity of the actor. Immutable after creation.
    pub client_ip: ActorId,
    /// Display name. Defaults to the identity.
    pub name: String,
    /// Target x coordinate.
    #[serde(deserialize_with = "lenient::saturating")]
    pub x: i32,
    /// Target y coordinate.
    #[serde(deserialize_with = "lenient::saturating")]
    pub y: i32,
    /// Red channel of the line color.
    #[serde(deserialize_with = "lenient::saturating")]
    pub r: u8,
    /// Green channel of the line color.
    #[serde(deserialize_with = "lenient::saturating")]
    pub g: u8,
    /// Blue channel of the line color.
    #[serde(deserialize_with = "lenient::saturating")]
    pub b: u8,
    /// Stroke weight.
    #[serde(deserialize_with = "lenient::saturating")]
    pub w: u16,
    /// How the last update arrived.
    #[serde(default, deserialize_with = "lenient::method_or_default")]
    pub method: UpdateMethod,
    /// When the record was last updated.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl ActorRecord {
    /// Create a record with default pose and style for `id`.
    ///
    /// The actor starts at the origin, white, weight 3, named after its
    /// identity.
    pub fn new(id: ActorId, now: DateTime<Utc>) -> Self {
        Self {
            name: id.to_string(),
            client_ip: id,
            x: 0,
            y: 0,
            r: DEFAULT_COLOR.r,
            g: DEFAULT_COLOR.g,
            b: DEFAULT_COLOR.b,
            w: DEFAULT_WEIGHT,
            method: UpdateMethod::default(),
            updated_at: now,
        }
    }

    /// Overwrite every field present in `patch` and stamp the record.
    ///
    /// Absent fields keep their previous value.
    pub fn apply(&mut self, patch: &ActorPatch, method: UpdateMethod, now: DateTime<Utc>) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(r) = patch.r {
            self.r = r;
        }
        if let Some(g) = patch.g {
            self.g = g;
        }
        if let Some(b) = patch.b {
            self.b = b;
        }
        if let Some(w) = patch.w {
            self.w = w;
        }
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        self.method = method;
        self.updated_at = now;
    }

    /// The target position as an `(x, y)` pair.
    pub const fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// The line color.
    pub const fn color(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

// ---------------------------------------------------------------------------
// ActorPatch
// ---------------------------------------------------------------------------

/// A range-checked partial update. `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorPatch {
    /// New target x.
    pub x: Option<i32>,
    /// New target y.
    pub y: Option<i32>,
    /// New red channel.
    pub r: Option<u8>,
    /// New green channel.
    pub g: Option<u8>,
    /// New blue channel.
    pub b: Option<u8>,
    /// New stroke weight.
    pub w: Option<u16>,
    /// New display name.
    pub name: Option<String>,
}

impl ActorPatch {
    /// Whether the patch carries no field at all.
    pub const fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.r.is_none()
            && self.g.is_none()
            && self.b.is_none()
            && self.w.is_none()
            && self.name.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixed_time(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn new_record_has_defaults() {
        let record = ActorRecord::new(ActorId::new("10.0.0.1"), fixed_time(100));
        assert_eq!(record.name, "10.0.0.1");
        assert_eq!(record.position(), (0, 0));
        assert_eq!(record.color(), DEFAULT_COLOR);
        assert_eq!(record.w, DEFAULT_WEIGHT);
        assert_eq!(record.method, UpdateMethod::Get);
    }

    #[test]
    fn apply_leaves_absent_fields_untouched() {
        let mut record = ActorRecord::new(ActorId::new("10.0.0.1"), fixed_time(100));
        record.apply(
            &ActorPatch {
                r: Some(10),
                w: Some(7),
                ..ActorPatch::default()
            },
            UpdateMethod::Post,
            fixed_time(200),
        );
        record.apply(
            &ActorPatch {
                x: Some(40),
                ..ActorPatch::default()
            },
            UpdateMethod::Get,
            fixed_time(300),
        );

        assert_eq!(record.x, 40);
        assert_eq!(record.y, 0);
        assert_eq!(record.color(), Rgb::new(10, 255, 255));
        assert_eq!(record.w, 7);
        assert_eq!(record.name, "10.0.0.1");
        assert_eq!(record.method, UpdateMethod::Get);
        assert_eq!(record.updated_at, fixed_time(300));
    }

    #[test]
    fn empty_patch_detection() {
        assert!(ActorPatch::default().is_empty());
        let patch = ActorPatch {
            name: Some(String::from("Speedy")),
            ..ActorPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let record = ActorRecord::new(ActorId::new("10.0.0.1"), fixed_time(0));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["clientIp"], "10.0.0.1");
        assert_eq!(json["method"], "GET");
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["w"], 3);
    }

    #[test]
    fn decodes_record_without_optional_fields() {
        let json = r#"{"clientIp":"1.2.3.4","name":"a","x":5,"y":6,"r":1,"g":2,"b":3,"w":4}"#;
        let record: ActorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.client_ip.as_str(), "1.2.3.4");
        assert_eq!(record.position(), (5, 6));
        assert_eq!(record.method, UpdateMethod::Get);
    }

    #[test]
    fn out_of_type_numbers_saturate_instead_of_failing() {
        let json = r#"{"clientIp":"1.2.3.4","name":"a","x":50,"y":60.4,"r":300,"g":-2,"b":7,"w":-4}"#;
        let record: ActorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.position(), (50, 60));
        assert_eq!(record.color(), Rgb::new(255, 0, 7));
        assert_eq!(record.w, 0);

        for (raw, expected) in [("70000", u16::MAX), ("2.5", 3), ("500", 500)] {
            let json = format!(
                r#"{{"clientIp":"1.2.3.4","name":"a","x":0,"y":0,"r":0,"g":0,"b":0,"w":{raw}}}"#
            );
            let record: ActorRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(record.w, expected, "w = {raw}");
        }
    }

    #[test]
    fn unknown_method_tag_falls_back_to_get() {
        let json = r#"{"clientIp":"1.2.3.4","name":"a","x":0,"y":0,"r":0,"g":0,"b":0,"w":1,"method":"PATCH"}"#;
        let record: ActorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.method, UpdateMethod::Get);

        let json = r#"{"clientIp":"1.2.3.4","name":"a","x":0,"y":0,"r":0,"g":0,"b":0,"w":1,"method":"post"}"#;
        let record: ActorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.method, UpdateMethod::Post);
    }
}
