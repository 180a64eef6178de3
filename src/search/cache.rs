//! Bounded query-result cache.
//!
//! Keyed by `(query, scope)`. Each snapshot generation owns one cache and
//! the whole cache is discarded on snapshot swap, never invalidated in
//! place — that removes the race between invalidation and lookup.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub scope: Option<String>,
}

/// Insertion-ordered map used as an LRU: hits move to the back, eviction
/// pops the front. Capacity is fixed at construction.
#[derive(Debug)]
pub struct QueryCache<V> {
    capacity: usize,
    entries: IndexMap<CacheKey, V>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::new(),
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        let value = self.entries.shift_remove(key)?;
        self.entries.insert(key.clone(), value.clone());
        Some(value)
    }

    pub fn insert(&mut self, key: CacheKey, value: V) {
        if self.capacity == 0 {
            return;
        }
        self.entries.shift_remove(&key);
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
