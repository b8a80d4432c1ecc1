//! Read-through TTL cache with in-flight de-duplication.
//!
//! At most one computation per key runs at a time. Callers that arrive
//! while it is in flight subscribe to its outcome and receive the same
//! value or the same error. A forced refresh runs its own computation and
//! overwrites the entry when it completes. Entries are replaced wholesale
//! and never mutated in place.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::schema::v1::Provenance;

#[derive(Debug)]
pub struct Cached<V> {
    pub value: Arc<V>,
    pub provenance: Provenance,
}

impl<V> Clone for Cached<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            provenance: self.provenance,
        }
    }
}

struct Entry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

/// Outcome slot of one in-flight computation; `None` until it finishes.
type Slot<V, E> = watch::Receiver<Option<Result<Cached<V>, E>>>;

pub struct TtlCache<K, V, E> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
    inflight: Mutex<HashMap<K, Slot<V, E>>>,
}

enum Role<V, E> {
    Owner(watch::Sender<Option<Result<Cached<V>, E>>>, Slot<V, E>),
    Waiter(Slot<V, E>),
}

/// Unregisters the owner's slot when its computation ends or is dropped,
/// so a cancelled owner never leaves the key blocked.
struct InflightGuard<'a, K, V, E>
where
    K: Eq + Hash,
{
    inflight: &'a Mutex<HashMap<K, Slot<V, E>>>,
    key: K,
    slot: Slot<V, E>,
}

impl<K, V, E> Drop for InflightGuard<'_, K, V, E>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock();
        if inflight
            .get(&self.key)
            .is_some_and(|slot| slot.same_channel(&self.slot))
        {
            inflight.remove(&self.key);
        }
    }
}

impl<K, V, E> TtlCache<K, V, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Clone + Display,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Live entry for `key`, if one exists and has not expired.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.value))
    }

    fn get_expired(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.lock();
        entries.get(key).map(|e| Arc::clone(&e.value))
    }

    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.lock().insert(
            key,
            Entry {
                value: Arc::clone(&value),
                stored_at: Instant::now(),
            },
        );
        value
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys with a computation currently in flight.
    pub fn inflight_len(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Returns the cached value for `key`, running `factory` when there is
    /// none. Concurrent callers for the same key share one computation and
    /// all receive its outcome, errors included. If the factory fails and an
    /// expired entry is still held, that entry is returned as
    /// [`Provenance::Stale`].
    ///
    /// Dropping the returned future before it resolves leaves the cache
    /// untouched; callers waiting on it start a fresh computation.
    pub async fn compute_if_absent<F, Fut>(
        &self,
        key: K,
        force: bool,
        factory: F,
    ) -> Result<Cached<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if force {
            debug!(key = ?key, "cache refresh forced");
            let result = factory().await;
            return self.finish(key, result, Provenance::Refreshed);
        }

        loop {
            let role = {
                let mut inflight = self.inflight.lock();
                // Owners insert before unregistering, so a finished
                // computation is always visible here.
                if let Some(value) = self.get(&key) {
                    debug!(key = ?key, "cache hit");
                    return Ok(Cached {
                        value,
                        provenance: Provenance::Hit,
                    });
                }
                match inflight.get(&key) {
                    Some(slot) => Role::Waiter(slot.clone()),
                    None => {
                        let (tx, slot) = watch::channel(None);
                        inflight.insert(key.clone(), slot.clone());
                        Role::Owner(tx, slot)
                    }
                }
            };

            match role {
                Role::Owner(tx, slot) => {
                    let _guard = InflightGuard {
                        inflight: &self.inflight,
                        key: key.clone(),
                        slot,
                    };
                    debug!(key = ?key, "cache miss");
                    let result = factory().await;
                    let outcome = self.finish(key, result, Provenance::Miss);
                    tx.send_replace(Some(outcome.clone()));
                    return outcome;
                }
                Role::Waiter(mut slot) => {
                    debug!(key = ?key, "cache busy, awaiting in-flight computation");
                    let shared = match slot.wait_for(Option::is_some).await {
                        Ok(done) => (*done).clone(),
                        Err(_) => None,
                    };
                    match shared {
                        Some(Ok(cached)) => {
                            let provenance = match cached.provenance {
                                Provenance::Stale => Provenance::Stale,
                                _ => Provenance::Busy,
                            };
                            return Ok(Cached {
                                value: cached.value,
                                provenance,
                            });
                        }
                        Some(Err(err)) => return Err(err),
                        None => {
                            debug!(key = ?key, "in-flight computation dropped, retrying");
                        }
                    }
                }
            }
        }
    }

    fn finish(&self, key: K, result: Result<V, E>, provenance: Provenance) -> Result<Cached<V>, E> {
        match result {
            Ok(value) => Ok(Cached {
                value: self.insert(key, value),
                provenance,
            }),
            Err(err) => match self.get_expired(&key) {
                Some(value) => {
                    warn!(key = ?key, error = %err, "recomputation failed, serving stale entry");
                    Ok(Cached {
                        value,
                        provenance: Provenance::Stale,
                    })
                }
                None => Err(err),
            },
        }
    }
}
