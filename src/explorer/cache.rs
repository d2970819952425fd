// Response cache - key -> (value, stored-at) with time-based expiry
// Owned by the explorer service; the clock is injected so tests never sleep

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Time source for the cache and the rate limiter
pub trait Clock: Send + Sync {
    /// Current Unix time in whole seconds
    fn now_unix(&self) -> u64;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Hand-driven clock for tests: starts at a fixed instant and only moves
/// when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at the given instant
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by the given number of seconds
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// One cached value and the instant it was stored
#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: u64,
}

/// In-memory response cache with a fixed TTL.
///
/// An entry is fresh strictly inside its TTL: a read at or after
/// `stored_at + ttl_secs` is a miss. Expired entries linger until
/// [`purge_expired`](Self::purge_expired) sweeps them or a fresh insert
/// overwrites the key.
pub struct ResponseCache<V> {
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> ResponseCache<V> {
    /// Create an empty cache with the given TTL and time source
    pub fn new(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_secs,
            clock,
            entries: HashMap::new(),
        }
    }

    /// Get the configured TTL in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Store a value under a key, replacing any previous entry
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let stored_at = self.clock.now_unix();
        self.entries.insert(key.into(), CacheEntry { value, stored_at });
    }

    /// Look up a fresh value. Expired or absent keys read as `None`.
    pub fn get(&self, key: &str) -> Option<&V> {
        let entry = self.entries.get(key)?;
        if self.is_fresh(entry) {
            Some(&entry.value)
        } else {
            None
        }
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sweep out every expired entry, returning how many were evicted
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let now = self.clock.now_unix();
        let ttl = self.ttl_secs;
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.stored_at) < ttl);
        before - self.entries.len()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        self.clock.now_unix().saturating_sub(entry.stored_at) < self.ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_within_ttl_miss_at_ttl() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut cache: ResponseCache<u32> = ResponseCache::new(60, clock.clone());

        cache.insert("k", 7);
        assert_eq!(cache.get("k"), Some(&7));

        clock.advance(59);
        assert_eq!(cache.get("k"), Some(&7));

        clock.advance(1);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn purge_counts_evictions() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache: ResponseCache<u32> = ResponseCache::new(10, clock.clone());

        cache.insert("a", 1);
        clock.advance(5);
        cache.insert("b", 2);
        clock.advance(5);

        // "a" is 10s old (expired), "b" is 5s old (fresh)
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(&2));
    }

    #[test]
    fn insert_refreshes_stored_at() {
        let clock = Arc::new(ManualClock::new(0));
        let mut cache: ResponseCache<u32> = ResponseCache::new(10, clock.clone());

        cache.insert("k", 1);
        clock.advance(9);
        cache.insert("k", 2);
        clock.advance(9);

        assert_eq!(cache.get("k"), Some(&2));
    }
}
