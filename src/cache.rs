//! TTL cache with a hard capacity cap.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source for the cache.
///
/// Defaults to the system monotonic clock; tests inject a controllable one.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> Instant + Send + Sync>);

impl Clock {
    /// The system monotonic clock.
    pub fn system() -> Self {
        Self(Arc::new(Instant::now))
    }

    /// Wraps an arbitrary `now` function.
    pub fn from_fn<F>(now: F) -> Self
    where
        F: Fn() -> Instant + Send + Sync + 'static,
    {
        Self(Arc::new(now))
    }

    fn now(&self) -> Instant {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Clock")
    }
}

#[derive(Clone, Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
    seq: u64,
}

/// String-keyed store of opaque values with per-entry TTL and a capacity cap.
///
/// Capacity eviction follows insertion order: reads neither extend TTL nor
/// promote, and overwrites keep the entry's original position. Not
/// internally synchronized; callers serialize access.
#[derive(Debug)]
pub struct TtlCache<V> {
    capacity: usize,
    entries: HashMap<String, Entry<V>>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
    clock: Clock,
}

impl<V> TtlCache<V> {
    /// Creates a cache holding at most `capacity` entries (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Clock::system())
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(capacity: usize, clock: Clock) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
            clock,
        }
    }

    /// Inserts or overwrites `key`, alive until `now + ttl`.
    ///
    /// A new key arriving at capacity evicts the oldest-inserted entry first.
    pub fn set(&mut self, key: &str, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.value = value;
            entry.expires_at = expires_at;
            return;
        }
        if self.capacity > 0 && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_owned());
        self.entries.insert(
            key.to_owned(),
            Entry {
                value,
                expires_at,
                seq,
            },
        );
    }

    /// Returns the live value under `key`, if any.
    ///
    /// An entry whose deadline has passed reads as absent even before the
    /// next [`remove_expired`](Self::remove_expired) sweep.
    pub fn get(&self, key: &str) -> Option<&V> {
        let entry = self.entries.get(key)?;
        if self.clock.now() >= entry.expires_at {
            return None;
        }
        Some(&entry.value)
    }

    /// Removes `key` if present.
    pub fn remove(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.order.remove(&entry.seq);
        }
    }

    /// Drops every entry whose deadline has passed.
    pub fn remove_expired(&mut self) {
        let now = self.clock.now();
        let expired: Vec<u64> = self
            .entries
            .values()
            .filter(|entry| now >= entry.expires_at)
            .map(|entry| entry.seq)
            .collect();
        for seq in expired {
            if let Some(key) = self.order.remove(&seq) {
                self.entries.remove(&key);
            }
        }
    }

    /// Number of stored entries, including not-yet-swept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.order.pop_first() {
            self.entries.remove(&key);
        }
    }
}
