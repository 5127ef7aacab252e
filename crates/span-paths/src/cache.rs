//! Read-through memoization of enumeration results.
//!
//! Keyed by the full query shape — endpoints, resolved algorithm, every
//! budget knob, and the graph content signature — so a cached entry can
//! never leak across graphs or configurations.  Unbounded: in practice the
//! entry count is the number of distinct query shapes an application issues.
//!
//! Concurrency: many readers, one writer (`std::sync::RwLock`); hit/miss
//! counters are atomic and monotone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use span_graph::RoutePath;

/// Monotone cache counters plus current size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Enumeration memo cache.
#[derive(Default)]
pub struct EnumCache {
    inner: RwLock<FxHashMap<String, Arc<Vec<RoutePath>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EnumCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, counting a hit or miss.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<RoutePath>>> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match guard.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `paths` under `key`.  Last writer wins; concurrent fills of the
    /// same key compute identical values, so either result is correct.
    pub fn insert(&self, key: String, paths: Vec<RoutePath>) -> Arc<Vec<RoutePath>> {
        let entry = Arc::new(paths);
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(key, Arc::clone(&entry));
        entry
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.inner.read().unwrap_or_else(|e| e.into_inner()).len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }
}
