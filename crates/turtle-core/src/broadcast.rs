//! Fan-out of actor records to push-stream subscribers.
//!
//! Every subscriber owns a bounded [`mpsc`] channel. [`BroadcastHub::publish`]
//! walks the subscriber list once with `try_send`, so it never waits on a
//! slow or vanished observer:
//!
//! - a full buffer drops that one message for that one subscriber
//!   (at-most-once delivery) and keeps the subscriber;
//! - a closed channel means the observer disconnected, and the subscriber
//!   is removed in the same pass without affecting anyone else.
//!
//! Dropping a [`Subscription`] unsubscribes it. Callers publish while
//! holding the actor's registry lock, which keeps events for one actor in
//! order; events for different actors may interleave freely.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use turtle_types::{ActorRecord, SubscriberId};

/// Dynamic set of push-stream observers.
#[derive(Debug)]
pub struct BroadcastHub {
    /// Live subscriber senders keyed by subscription.
    subscribers: Mutex<BTreeMap<SubscriberId, mpsc::Sender<ActorRecord>>>,

    /// Buffer size for each new subscriber channel.
    capacity: usize,
}

impl BroadcastHub {
    /// Create a hub whose subscribers buffer up to `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(BTreeMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a new observer.
    ///
    /// The subscription sees every record published from now on and no
    /// backlog.
    pub async fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = SubscriberId::new();
        let count = {
            let mut subscribers = self.subscribers.lock().await;
            subscribers.insert(id, tx);
            subscribers.len()
        };
        debug!(subscriber = %id, subscribers = count, "Subscriber registered");

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(self),
        }
    }

    /// Push one record to every subscriber.
    ///
    /// Returns how many subscribers accepted the record. Zero subscribers
    /// is not an error.
    pub async fn publish(&self, record: &ActorRecord) -> usize {
        let mut delivered: usize = 0;
        let mut subscribers = self.subscribers.lock().await;

        subscribers.retain(|id, tx| match tx.try_send(record.clone()) {
            Ok(()) => {
                delivered = delivered.saturating_add(1);
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(
                    subscriber = %id,
                    actor = %record.client_ip,
                    "Subscriber buffer full, dropping event"
                );
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = %id, "Subscriber disconnected, removing");
                false
            }
        });

        delivered
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.lock().await.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "Subscriber unsubscribed");
        }
        removed
    }

    /// Number of registered observers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Receiving end of one push-stream subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<ActorRecord>,
    hub: Weak<BroadcastHub>,
}

impl Subscription {
    /// The subscription's identifier.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next published record.
    ///
    /// Returns `None` once the subscription has been removed from the hub
    /// or the hub itself is gone.
    pub async fn recv(&mut self) -> Option<ActorRecord> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Contended lock: the closed receiver makes the next publish prune us.
        if let Some(hub) = self.hub.upgrade()
            && let Ok(mut subscribers) = hub.subscribers.try_lock()
        {
            subscribers.remove(&self.id);
            debug!(subscriber = %self.id, "Subscription dropped");
        }
    }
}
