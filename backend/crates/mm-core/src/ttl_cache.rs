//! Bounded LRU cache with per-entry expiry.
//!
//! Expired entries are dropped lazily on access, or in bulk via
//! [`TtlCache::purge_expired`]. When the cache is full the least recently
//! used entry is evicted to make room.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Front is least recently used
    access_order: VecDeque<K>,
    max_entries: usize,
    default_ttl: Duration,
    hits: u64,
    misses: u64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// `max_entries` is clamped to at least one.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            access_order: VecDeque::new(),
            max_entries: max_entries.max(1),
            default_ttl,
            hits: 0,
            misses: 0,
        }
    }

    /// Get a live entry, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();

        match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => {}
            Some(_) => {
                self.remove(key);
                self.misses += 1;
                return None;
            }
            None => {
                self.misses += 1;
                return None;
            }
        }

        self.touch(key);
        self.hits += 1;
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert with the default TTL, returning the previous live value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let ttl = self.default_ttl;
        self.insert_with_ttl(key, value, ttl)
    }

    pub fn insert_with_ttl(&mut self, key: K, value: V, ttl: Duration) -> Option<V> {
        let now = Instant::now();
        let previous = self.entries.remove(&key).and_then(|e| {
            if now < e.expires_at {
                Some(e.value)
            } else {
                None
            }
        });
        self.access_order.retain(|k| k != &key);

        while self.entries.len() >= self.max_entries {
            if !self.evict_least_recent() {
                break;
            }
        }

        self.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
        self.access_order.push_back(key);

        previous
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.access_order.retain(|k| k != key);
        Some(entry.value)
    }

    /// Non-destructive liveness check; does not touch recency or stats.
    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| Instant::now() < e.expires_at)
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, e)| now >= e.expires_at)
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }

        expired.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Entry count, including expired entries not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key)
            && let Some(k) = self.access_order.remove(pos)
        {
            self.access_order.push_back(k);
        }
    }

    fn evict_least_recent(&mut self) -> bool {
        match self.access_order.pop_front() {
            Some(oldest) => {
                self.entries.remove(&oldest);
                true
            }
            None => false,
        }
    }
}
