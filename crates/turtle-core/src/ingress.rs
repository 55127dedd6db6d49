//! Update ingress: validation, registry mutation and broadcast.
//!
//! Both HTTP entry points (query string and JSON body) deserialize into a
//! [`TurtleUpdate`] and hand it to [`UpdateIngress::submit`] together with
//! the request origin. Ingress owns the ordering contract:
//!
//! 1. validate every present field (nothing changes on failure);
//! 2. a reset request clears the registry;
//! 3. an update without fields is answered with the help document;
//! 4. otherwise resolve identity, apply the patch under the actor's lock
//!    and publish the resulting record before releasing the lock.

use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use turtle_types::{ActorPatch, ActorRecord, UpdateMethod};
use validator::{Validate, ValidationErrors};

use crate::broadcast::BroadcastHub;
use crate::identity::{IdentityError, RequestOrigin};
use crate::registry::ActorRegistry;

/// Errors reported back to the caller of an update.
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    /// One or more fields were out of range.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The caller's identity could not be derived.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The field name as it appears in the request.
    pub field: String,
    /// Why the value was rejected.
    pub message: String,
}

/// A partial update as received from either entry point.
///
/// Numeric channels are accepted as wide integers so out-of-range values
/// reach validation instead of failing deserialization. Empty values
/// (`?x=`, `"name": ""`) count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct TurtleUpdate {
    /// Target x coordinate.
    #[serde(default, deserialize_with = "optional_int")]
    pub x: Option<i32>,
    /// Target y coordinate.
    #[serde(default, deserialize_with = "optional_int")]
    pub y: Option<i32>,
    /// Red channel.
    #[serde(default, deserialize_with = "optional_int")]
    #[validate(range(min = 0, max = 255, message = "must be between 0 and 255"))]
    pub r: Option<i64>,
    /// Green channel.
    #[serde(default, deserialize_with = "optional_int")]
    #[validate(range(min = 0, max = 255, message = "must be between 0 and 255"))]
    pub g: Option<i64>,
    /// Blue channel.
    #[serde(default, deserialize_with = "optional_int")]
    #[validate(range(min = 0, max = 255, message = "must be between 0 and 255"))]
    pub b: Option<i64>,
    /// Stroke weight.
    #[serde(default, deserialize_with = "optional_int")]
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200"))]
    pub w: Option<i64>,
    /// Display name.
    pub name: Option<String>,
    /// Reset flag: any truthy value clears every actor.
    pub c: Option<String>,
}

/// Decode an optional integer from a JSON number or a query-string value.
///
/// `null` and blank strings yield `None`.
fn optional_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + FromStr,
    <T as FromStr>::Err: Display,
{
    deserializer.deserialize_any(OptionalInt(PhantomData))
}

struct OptionalInt<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for OptionalInt<T>
where
    T: TryFrom<i64> + FromStr,
    <T as FromStr>::Err: Display,
{
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        T::try_from(v)
            .ok()
            .ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
            .map(Some)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
            .map(Some)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let v = v.trim();
        if v.is_empty() {
            return Ok(None);
        }
        v.parse().map(Some).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl TurtleUpdate {
    /// Whether the caller asked to clear the registry.
    pub fn reset_requested(&self) -> bool {
        self.c
            .as_deref()
            .is_some_and(|v| !matches!(v.trim(), "" | "0" | "false"))
    }

    /// Validate and convert into a registry patch.
    pub fn to_patch(&self) -> Result<ActorPatch, Vec<FieldError>> {
        self.validate().map_err(|e| field_errors(&e))?;

        Ok(ActorPatch {
            x: self.x,
            y: self.y,
            r: narrow("r", self.r)?,
            g: narrow("g", self.g)?,
            b: narrow("b", self.b)?,
            w: narrow("w", self.w)?,
            name: self.name.clone().filter(|name| !name.is_empty()),
        })
    }
}

/// Convert a validated wide integer into its storage type.
fn narrow<T: TryFrom<i64>>(field: &str, value: Option<i64>) -> Result<Option<T>, Vec<FieldError>> {
    value
        .map(|v| {
            T::try_from(v).ok().ok_or_else(|| {
                vec![FieldError {
                    field: field.to_owned(),
                    message: format!("value {v} out of range"),
                }]
            })
        })
        .transpose()
}

/// Flatten `validator` output into a stable, sorted list.
fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut list: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| FieldError {
                field: field.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map_or_else(|| err.code.to_string(), ToString::to_string),
            })
        })
        .collect();
    list.sort_by(|a, b| a.field.cmp(&b.field));
    list
}

/// What an accepted submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngressOutcome {
    /// Nothing to apply; the caller should be shown the help document.
    Help,
    /// The actor was updated and broadcast.
    Updated {
        /// The record after the update.
        record: ActorRecord,
        /// Number of subscribers that accepted the broadcast.
        delivered: usize,
    },
    /// The registry was cleared.
    Reset {
        /// Number of actors removed.
        cleared: usize,
    },
}

/// Applies validated updates to the registry and broadcasts the result.
#[derive(Debug, Clone)]
pub struct UpdateIngress {
    registry: Arc<ActorRegistry>,
    hub: Arc<BroadcastHub>,
}

impl UpdateIngress {
    /// Wire ingress to a registry and a broadcast hub.
    pub const fn new(registry: Arc<ActorRegistry>, hub: Arc<BroadcastHub>) -> Self {
        Self { registry, hub }
    }

    /// Handle one update request.
    pub async fn submit(
        &self,
        origin: &RequestOrigin,
        update: &TurtleUpdate,
        method: UpdateMethod,
    ) -> Result<IngressOutcome, IngressError> {
        let patch = update.to_patch().map_err(|errors| {
            debug!(errors = errors.len(), %method, "Rejected update");
            IngressError::Validation(errors)
        })?;

        if update.reset_requested() {
            let cleared = self.registry.reset_all().await;
            return Ok(IngressOutcome::Reset { cleared });
        }

        if patch.is_empty() {
            return Ok(IngressOutcome::Help);
        }

        let id = origin.resolve()?;
        let now = Utc::now();

        let mut guard = self.registry.lock_actor(&id, now).await;
        guard.apply(&patch, method, now);
        let record = guard.clone();
        let delivered = self.hub.publish(&record).await;
        drop(guard);

        info!(actor = %id, %method, x = record.x, y = record.y, delivered, "Actor updated");

        Ok(IngressOutcome::Updated { record, delivered })
    }
}
