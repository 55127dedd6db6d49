//! Server-side actor registry.
//!
//! The registry maps each [`ActorId`] to its authoritative [`ActorRecord`].
//! The map itself sits behind an async [`RwLock`] that is only held long
//! enough to find or insert an entry; every record then has its own
//! [`Mutex`]. Updates to one actor are therefore serialized with each
//! other while updates to different actors never wait on a shared record
//! lock.
//!
//! Records are never deleted individually. Actors that stop sending
//! updates simply age out of [`ActorRegistry::list_since`] once their last
//! update falls outside the recency window.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};
use turtle_types::{ActorId, ActorPatch, ActorRecord, UpdateMethod};

/// Shared handle to one actor's record.
type ActorEntry = Arc<Mutex<ActorRecord>>;

/// In-memory registry of every actor seen since process start.
#[derive(Debug)]
pub struct ActorRegistry {
    /// Actor records keyed by identity.
    actors: RwLock<BTreeMap<ActorId, ActorEntry>>,

    /// Default look-back for snapshot queries.
    recency_window: TimeDelta,
}

impl ActorRegistry {
    /// Create an empty registry with the given default recency window.
    pub fn new(recency_window: Duration) -> Self {
        Self {
            actors: RwLock::new(BTreeMap::new()),
            recency_window: TimeDelta::from_std(recency_window).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Return the record for `id`, creating a default one if needed.
    ///
    /// Creation alone is not broadcast.
    pub async fn get_or_create(&self, id: &ActorId) -> ActorRecord {
        let entry = self.entry(id, Utc::now()).await;
        let record = entry.lock().await;
        record.clone()
    }

    /// Lock the record for `id`, creating it if needed.
    ///
    /// While the guard is held no other update to the same actor can
    /// proceed. Ingress keeps the guard across the broadcast so events for
    /// one actor leave the server in the order they were applied.
    pub async fn lock_actor(&self, id: &ActorId, now: DateTime<Utc>) -> OwnedMutexGuard<ActorRecord> {
        self.entry(id, now).await.lock_owned().await
    }

    /// Apply a partial update stamped with the current time.
    pub async fn apply_partial_update(
        &self,
        id: &ActorId,
        patch: &ActorPatch,
        method: UpdateMethod,
    ) -> ActorRecord {
        self.apply_partial_update_at(id, patch, method, Utc::now())
            .await
    }

    /// Apply a partial update stamped with `now`.
    ///
    /// Fields absent from `patch` keep their previous values. Returns the
    /// record as it stands after the update.
    pub async fn apply_partial_update_at(
        &self,
        id: &ActorId,
        patch: &ActorPatch,
        method: UpdateMethod,
        now: DateTime<Utc>,
    ) -> ActorRecord {
        let mut record = self.lock_actor(id, now).await;
        record.apply(patch, method, now);
        record.clone()
    }

    /// Return every record whose last update is at or after `since`.
    ///
    /// The result has no defined order.
    pub async fn list_since(&self, since: DateTime<Utc>) -> Vec<ActorRecord> {
        let entries: Vec<ActorEntry> = self.actors.read().await.values().cloned().collect();

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let record = entry.lock().await;
            if record.updated_at >= since {
                records.push(record.clone());
            }
        }
        records
    }

    /// The cut-off used when a snapshot query gives no explicit `since`.
    pub fn default_since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.recency_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Remove every actor. Returns how many records were dropped.
    ///
    /// An update that already holds an actor's lock when the reset lands
    /// finishes against the detached record; the next update for that
    /// identity starts from defaults.
    pub async fn reset_all(&self) -> usize {
        let mut actors = self.actors.write().await;
        let cleared = actors.len();
        actors.clear();
        info!(cleared, "Actor registry reset");
        cleared
    }

    /// Number of actors currently held.
    pub async fn len(&self) -> usize {
        self.actors.read().await.len()
    }

    /// Whether the registry holds no actors.
    pub async fn is_empty(&self) -> bool {
        self.actors.read().await.is_empty()
    }

    /// Find or insert the entry for `id`.
    async fn entry(&self, id: &ActorId, now: DateTime<Utc>) -> ActorEntry {
        {
            let actors = self.actors.read().await;
            if let Some(entry) = actors.get(id) {
                return Arc::clone(entry);
            }
        }

        let mut actors = self.actors.write().await;
        let entry = actors.entry(id.clone()).or_insert_with(|| {
            debug!(actor = %id, "Creating actor record");
            Arc::new(Mutex::new(ActorRecord::new(id.clone(), now)))
        });
        Arc::clone(entry)
    }
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}
