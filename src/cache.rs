//! Byte-budgeted LRU cache.
//!
//! Entries are kept in an `IndexMap` ordered by recency: the front is the
//! least recently used entry, the back the most recent. Every hit moves the
//! entry to the back and eviction pops from the front.

use std::hash::Hash;

use indexmap::IndexMap;
use tracing::{debug, trace};

/// Log cache statistics every this many lookups
const STATS_LOG_INTERVAL: u64 = 1000;

#[derive(Debug)]
struct Slot<V> {
    value: V,
    size: usize,
}

/// Snapshot of a cache's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub resident_bytes: usize,
    pub budget: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug)]
pub struct LruCache<K, V> {
    name: &'static str,
    entries: IndexMap<K, Slot<V>, ahash::RandomState>,
    budget: usize,
    total: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    last_stats_log: u64,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    pub fn new(name: &'static str, budget: usize) -> Self {
        Self {
            name,
            entries: IndexMap::default(),
            budget,
            total: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
            last_stats_log: 0,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Sum of the sizes of all resident entries
    pub fn total_size(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Presence check that leaves recency untouched
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(index) = self.entries.get_index_of(key) else {
            self.misses = self.misses.saturating_add(1);
            trace!(cache = self.name, "cache miss");
            self.maybe_log_stats();
            return None;
        };

        self.hits = self.hits.saturating_add(1);
        trace!(cache = self.name, "cache hit");
        self.maybe_log_stats();

        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, slot)| &slot.value)
    }

    /// Counted lookup that only reports presence; a hit marks `key` most
    /// recently used.
    pub fn touch(&mut self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Uncounted lookup that leaves recency untouched
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Insert or overwrite `key`, evicting least recently used entries first.
    ///
    /// An entry larger than the whole budget is still admitted once
    /// everything else has been evicted.
    pub fn put(&mut self, key: K, value: V, size: usize) {
        if let Some(old) = self.entries.shift_remove(&key) {
            self.total -= old.size;
        }

        while !self.entries.is_empty() && self.total.saturating_add(size) > self.budget {
            self.evict_oldest();
        }

        self.total += size;
        self.entries.insert(key, Slot { value, size });
    }

    /// Drop every entry; counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            resident_bytes: self.total,
            budget: self.budget,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((_, slot)) = self.entries.shift_remove_index(0) {
            self.total -= slot.size;
            self.evictions = self.evictions.saturating_add(1);
            trace!(cache = self.name, size = slot.size, resident = self.total, "cache eviction");
        }
    }

    fn maybe_log_stats(&mut self) {
        let total = self.hits + self.misses;
        if total.saturating_sub(self.last_stats_log) < STATS_LOG_INTERVAL {
            return;
        }
        self.last_stats_log = total;
        let hit_rate = (self.hits as f64 / total as f64) * 100.0;
        debug!(
            cache = self.name,
            hits = self.hits,
            misses = self.misses,
            evictions = self.evictions,
            resident_entries = self.entries.len(),
            resident_bytes = self.total,
            hit_rate = %format!("{hit_rate:.1}%"),
            "cache stats"
        );
    }
}
