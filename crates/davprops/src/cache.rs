// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Cache of deserialized sidecar files, shared by the stores of a process.
//!
//! Stores overwrite the value for a key on every load and save, and drop it
//! when the sidecar has vanished. Eviction belongs to the cache.

use crate::data::StoreData;
use async_trait::async_trait;
use log::debug;
use moka::future::Cache;
use moka::notification::RemovalCause;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[async_trait]
pub trait StoreCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<StoreData>;

    async fn insert(&self, key: String, data: StoreData);

    async fn remove(&self, key: &str);
}

/// Counters reported by `MemoryStoreCache::stats`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

/// Bounded in-memory cache backed by `moka`, holding at most `capacity`
/// sidecar files
pub struct MemoryStoreCache {
    entries: Cache<String, StoreData>,
    counters: Arc<Counters>,
}

impl MemoryStoreCache {
    pub const DEFAULT_CAPACITY: u64 = 1024;

    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let counters = Arc::new(Counters::default());
        let on_evict = Arc::clone(&counters);
        let entries = Cache::builder()
            .max_capacity(capacity.max(1))
            .eviction_listener(move |key: Arc<String>, _value, cause| {
                if cause == RemovalCause::Size {
                    _ = on_evict.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!("MemoryStoreCache: evicted {key}");
                }
            })
            .build();
        Self { entries, counters }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            inserts: self.counters.inserts.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }

    /// Number of cached sidecar files, after pending maintenance has run
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
        debug!("MemoryStoreCache: cache cleared");
    }
}

impl Default for MemoryStoreCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl StoreCache for MemoryStoreCache {
    async fn get(&self, key: &str) -> Option<StoreData> {
        let found = self.entries.get(key).await;
        let counter = if found.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        _ = counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    async fn insert(&self, key: String, data: StoreData) {
        _ = self.counters.inserts.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(key, data).await;
    }

    async fn remove(&self, key: &str) {
        self.entries.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hits_and_misses() {
        let cache = MemoryStoreCache::default();
        assert!(cache.get("a").await.is_none());
        cache.insert("a".to_string(), StoreData::default()).await;
        assert!(cache.get("a").await.is_some());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.inserts), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let cache = MemoryStoreCache::default();
        cache.insert("a".to_string(), StoreData::default()).await;
        cache.insert("b".to_string(), StoreData::default()).await;

        cache.remove("a").await;
        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[tokio::test]
    async fn test_bounded_by_capacity() {
        let cache = MemoryStoreCache::new(4);
        for i in 0..64 {
            cache.insert(format!("key{i}"), StoreData::default()).await;
        }

        let len = cache.len().await;
        assert!(len <= 4, "cache holds {len} entries");
        assert!(cache.stats().evictions > 0);
        assert_eq!(cache.stats().inserts, 64);
    }
}
