//! Bounded key-value cache with per-entry expiry.
//!
//! The service depends on the [`TtlCache`] trait, not on a concrete store,
//! so an external cache can replace [`InMemoryTtlCache`] without touching
//! business logic.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

/// Key-value store whose entries expire.
pub trait TtlCache<K, V>: Send + Sync + fmt::Debug {
    /// Returns a live value for `key`, if any.
    fn get(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key` for `ttl`.
    fn put(&self, key: K, value: V, ttl: Duration);

    /// Number of stored entries, expired ones included until they are read
    /// or evicted.
    fn len(&self) -> usize;

    /// Returns `true` when nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Slot<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> Slot<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-process [`TtlCache`] over an LRU holding at most `capacity` entries.
///
/// A full write evicts the least recently used entry. Expired entries are
/// dropped when read.
pub struct InMemoryTtlCache<K, V> {
    entries: Mutex<LruCache<K, Slot<V>>>,
}

impl<K, V> fmt::Debug for InMemoryTtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTtlCache").finish_non_exhaustive()
    }
}

impl<K, V> InMemoryTtlCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty cache. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, Slot<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> TtlCache<K, V> for InMemoryTtlCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        let live = entries
            .get(key)
            .filter(|slot| slot.is_live(Instant::now()))
            .map(|slot| slot.value.clone());
        if live.is_none() {
            entries.pop(key);
        }
        live
    }

    fn put(&self, key: K, value: V, ttl: Duration) {
        let slot = Slot {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };
        self.lock().put(key, slot);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
