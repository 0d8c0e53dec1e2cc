//! Hit-counting analysis cache stores
//!
//! [`AnalysisCache`] is the seam callers inject. Two in-process stores ship
//! with the crate:
//! - [`MemoryCache`]: unbounded, `DashMap`-backed, for tests and single runs
//! - [`BoundedCache`]: moka-backed with capacity and TTL eviction

use crate::entry::CachedAnalysis;
use crate::error::CacheError;
use async_trait::async_trait;
use dashmap::DashMap;
use decomp_model::AnalysisHash;
use moka::future::Cache;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Key/value store for analysis results
///
/// A hit increments the stored `hit_count` by exactly one and returns the
/// updated entry. A miss has no side effects. `set` is last-writer-wins.
#[async_trait]
pub trait AnalysisCache: Send + Sync + Debug {
    /// Look up an entry, counting the hit
    async fn get(&self, hash: &AnalysisHash) -> Result<Option<CachedAnalysis>, CacheError>;

    /// Store an entry, replacing any previous one
    async fn set(&self, hash: AnalysisHash, entry: CachedAnalysis) -> Result<(), CacheError>;
}

fn record_lookup(backend: &'static str, hash: &AnalysisHash, hit: Option<&CachedAnalysis>) {
    match hit {
        Some(entry) => {
            metrics::counter!("decomp_cache_hits_total").increment(1);
            tracing::debug!(backend, %hash, hit_count = entry.hit_count, "analysis cache hit");
        }
        None => {
            metrics::counter!("decomp_cache_misses_total").increment(1);
            tracing::debug!(backend, %hash, "analysis cache miss");
        }
    }
}

/// Unbounded in-memory store
///
/// Increments happen under the map's shard lock so concurrent readers never
/// lose an update.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<AnalysisHash, CachedAnalysis>,
}

impl MemoryCache {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop one entry
    pub fn invalidate(&self, hash: &AnalysisHash) {
        self.entries.remove(hash);
    }
}

#[async_trait]
impl AnalysisCache for MemoryCache {
    async fn get(&self, hash: &AnalysisHash) -> Result<Option<CachedAnalysis>, CacheError> {
        let found = self.entries.get_mut(hash).map(|mut entry| entry.record_hit());
        record_lookup("memory", hash, found.as_ref());
        Ok(found)
    }

    async fn set(&self, hash: AnalysisHash, entry: CachedAnalysis) -> Result<(), CacheError> {
        self.entries.insert(hash, entry);
        Ok(())
    }
}

/// Capacity- and TTL-bounded in-memory store
///
/// Each value sits behind its own mutex so hit counting is serialized per
/// entry while moka handles eviction.
#[derive(Debug, Clone)]
pub struct BoundedCache {
    inner: Cache<AnalysisHash, Arc<Mutex<CachedAnalysis>>>,
}

impl BoundedCache {
    /// Create store with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create store with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Drop one entry
    #[inline]
    pub async fn invalidate(&self, hash: &AnalysisHash) {
        self.inner.invalidate(hash).await;
    }

    /// Flush pending eviction work
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl AnalysisCache for BoundedCache {
    async fn get(&self, hash: &AnalysisHash) -> Result<Option<CachedAnalysis>, CacheError> {
        let found = self
            .inner
            .get(hash)
            .await
            .map(|slot| slot.lock().record_hit());
        record_lookup("bounded", hash, found.as_ref());
        Ok(found)
    }

    async fn set(&self, hash: AnalysisHash, entry: CachedAnalysis) -> Result<(), CacheError> {
        self.inner.insert(hash, Arc::new(Mutex::new(entry))).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomp_model::{AnalysisMeta, Decomposition};
    use pretty_assertions::assert_eq;

    fn entry(hash: AnalysisHash, title: &str) -> CachedAnalysis {
        CachedAnalysis::new(
            hash,
            Decomposition::empty("d1", title),
            AnalysisMeta::new("v3", "model-a").with_tokens(1200, 800),
        )
    }

    async fn roundtrip_counts_hits(cache: &dyn AnalysisCache) {
        let hash = AnalysisHash::new([1; 8]);
        let stored = entry(hash, "Payroll");
        let cached_at = stored.cached_at;
        cache.set(hash, stored).await.unwrap();

        for expected in 1..=3 {
            let hit = cache.get(&hash).await.unwrap().unwrap();
            assert_eq!(hit.hit_count, expected);
            assert_eq!(hit.cached_at, cached_at);
            assert_eq!(hit.decomposition.title, "Payroll");
        }
    }

    async fn miss_returns_none(cache: &dyn AnalysisCache) {
        assert!(cache.get(&AnalysisHash::new([9; 8])).await.unwrap().is_none());
    }

    async fn set_overwrites(cache: &dyn AnalysisCache) {
        let hash = AnalysisHash::new([2; 8]);
        cache.set(hash, entry(hash, "first")).await.unwrap();
        cache.get(&hash).await.unwrap();
        cache.set(hash, entry(hash, "second")).await.unwrap();

        let hit = cache.get(&hash).await.unwrap().unwrap();
        assert_eq!(hit.decomposition.title, "second");
        assert_eq!(hit.hit_count, 1);
    }

    #[tokio::test]
    async fn memory_cache_semantics() {
        let cache = MemoryCache::new();
        roundtrip_counts_hits(&cache).await;
        miss_returns_none(&cache).await;
        set_overwrites(&cache).await;
        assert_eq!(cache.len(), 2);

        cache.invalidate(&AnalysisHash::new([1; 8]));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn bounded_cache_semantics() {
        let cache = BoundedCache::new(100);
        roundtrip_counts_hits(&cache).await;
        miss_returns_none(&cache).await;
        set_overwrites(&cache).await;
        cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 2);
    }

    #[tokio::test]
    async fn bounded_cache_stays_within_capacity() {
        let cache = BoundedCache::new(4);
        for i in 0..20u8 {
            let hash = AnalysisHash::new([i; 8]);
            cache.set(hash, entry(hash, "flow")).await.unwrap();
        }
        cache.run_pending_tasks().await;
        assert!(cache.entry_count() <= 4);
    }

    #[tokio::test]
    async fn miss_does_not_create_entry() {
        let cache = MemoryCache::new();
        miss_returns_none(&cache).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = BoundedCache::new(10);
        let hash = AnalysisHash::new([3; 8]);
        cache.set(hash, entry(hash, "gone")).await.unwrap();
        cache.invalidate(&hash).await;
        assert!(cache.get(&hash).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_hits_are_not_lost() {
        let caches: Vec<Arc<dyn AnalysisCache>> =
            vec![Arc::new(MemoryCache::new()), Arc::new(BoundedCache::new(10))];

        for cache in caches {
            let hash = AnalysisHash::new([7; 8]);
            cache.set(hash, entry(hash, "hot")).await.unwrap();

            let tasks: Vec<_> = (0..50)
                .map(|_| {
                    let cache = Arc::clone(&cache);
                    tokio::spawn(async move { cache.get(&hash).await.unwrap().is_some() })
                })
                .collect();
            for task in tasks {
                assert!(task.await.unwrap());
            }

            let last = cache.get(&hash).await.unwrap().unwrap();
            assert_eq!(last.hit_count, 51);
        }
    }
}
