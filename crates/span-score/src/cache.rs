//! Bounded FIFO cache of feature vectors.
//!
//! Keyed by `(bridge id, 5-minute bucket)` — feature vectors are pure
//! functions of that pair (plus the scorer's fixed seed), so cached entries
//! never go stale within a scorer's lifetime.  Eviction is FIFO by
//! insertion order; re-inserting an existing key refreshes its position at
//! the tail without changing the size.
//!
//! Concurrency: the map and its insertion-order list are updated together
//! under one `RwLock`, so readers always observe a consistent pair.
//! Hit/miss counters are atomic and monotone.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::features::FEATURE_LEN;

/// Cache key: bridge id × 5-minute local-time bucket.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FeatureKey {
    pub bridge_id: String,
    pub bucket: u32,
}

impl FeatureKey {
    pub fn new(bridge_id: impl Into<String>, bucket: u32) -> Self {
        Self {
            bridge_id: bridge_id.into(),
            bucket,
        }
    }
}

/// Counter snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeatureCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

#[derive(Default)]
struct Inner {
    map: FxHashMap<FeatureKey, [f64; FEATURE_LEN]>,
    /// Keys in insertion order; front is next to evict.
    order: VecDeque<FeatureKey>,
}

/// Bounded feature-vector cache.
pub struct FeatureCache {
    inner: RwLock<Inner>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FeatureCache {
    pub const DEFAULT_CAPACITY: usize = 1_000;

    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a vector, counting a hit or miss.
    pub fn get(&self, key: &FeatureKey) -> Option<[f64; FEATURE_LEN]> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match guard.map.get(key).copied() {
            Some(features) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(features)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or refresh a vector.
    ///
    /// A fresh key evicts the oldest entry once the cache is full; an
    /// existing key moves to the tail and keeps the size unchanged.
    pub fn insert(&self, key: FeatureKey, features: [f64; FEATURE_LEN]) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let inner = &mut *guard;

        if inner.map.insert(key.clone(), features).is_some() {
            inner.order.retain(|k| k != &key);
        }
        inner.order.push_back(key);

        while inner.map.len() > self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in insertion order, oldest first.
    pub fn keys_in_order(&self) -> Vec<FeatureKey> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.order.iter().cloned().collect()
    }

    pub fn stats(&self) -> FeatureCacheStats {
        FeatureCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.len(),
            capacity: self.capacity,
        }
    }
}

impl Default for FeatureCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
