//! Byte-bounded in-memory cache using moka.
//!
//! Backed by `moka::future::Cache`, whose reads are lock-free and whose
//! eviction runs without a global lock, so it is safe to hit from many tasks
//! on the Tokio runtime at once.
//!
//! Entries are weighted by [`Weighted::weight`], and the cache evicts least
//! recently used entries once the total weight passes the configured limit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::future::Cache;

/// A value whose memory footprint can be estimated in bytes.
pub trait Weighted {
    /// Approximate size in bytes.
    fn weight(&self) -> usize;
}

impl<T: Weighted + ?Sized> Weighted for Arc<T> {
    fn weight(&self) -> usize {
        (**self).weight()
    }
}

/// Hit/miss counters and occupancy of a [`MemoryCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
    pub size_bytes: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory cache keyed by string with LRU eviction by weight.
pub struct MemoryCache<V> {
    cache: Cache<String, V>,
    max_size_bytes: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> MemoryCache<V>
where
    V: Weighted + Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `max_size_bytes` of weighted values.
    pub fn new(max_size_bytes: u64) -> Self {
        let cache = Cache::builder()
            .weigher(|_key: &String, value: &V| -> u32 {
                // moka weights are u32
                value.weight().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            .build();

        Self {
            cache,
            max_size_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up a value, recording a hit or miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        match self.cache.get(key).await {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Inserts or replaces a value.
    pub async fn put(&self, key: String, value: V) {
        self.cache.insert(key, value).await;
    }

    /// Checks presence without touching statistics or recency.
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Number of entries; may lag until pending maintenance runs.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Total weight of stored entries.
    pub fn size_bytes(&self) -> u64 {
        self.cache.weighted_size()
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entry_count(),
            size_bytes: self.size_bytes(),
        }
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Runs pending eviction and bookkeeping so counts are current.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Blob(Vec<u8>);

    impl Weighted for Blob {
        fn weight(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn test_memory_cache_new() {
        let cache: MemoryCache<Blob> = MemoryCache::new(1_000_000);
        assert_eq!(cache.max_size_bytes(), 1_000_000);
        assert_eq!(cache.entry_count(), 0);
        assert_eq!(cache.size_bytes(), 0);
    }

    #[tokio::test]
    async fn test_memory_cache_put_and_get() {
        let cache = MemoryCache::new(1_000_000);
        cache.put("a".to_string(), Blob(vec![1, 2, 3])).await;

        assert_eq!(cache.get("a").await, Some(Blob(vec![1, 2, 3])));
        assert!(cache.contains("a"));
        cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_cache_miss() {
        let cache: MemoryCache<Blob> = MemoryCache::new(1_000_000);
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_memory_cache_size_tracking() {
        let cache = MemoryCache::new(1_000_000);
        cache.put("a".to_string(), Blob(vec![0; 1000])).await;
        cache.put("b".to_string(), Blob(vec![0; 2000])).await;
        cache.run_pending_tasks().await;

        assert_eq!(cache.size_bytes(), 3000);
        assert_eq!(cache.entry_count(), 2);
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = MemoryCache::new(1_000_000);
        cache.put("a".to_string(), Blob(vec![1])).await;

        cache.clear().await;

        assert_eq!(cache.entry_count(), 0);
        assert!(!cache.contains("a"));
    }

    #[tokio::test]
    async fn test_memory_cache_lru_eviction() {
        let cache = MemoryCache::new(2500);
        for key in ["a", "b", "c"] {
            cache.put(key.to_string(), Blob(vec![0; 1000])).await;
            cache.run_pending_tasks().await;
        }

        assert!(
            cache.size_bytes() <= 2500,
            "cache should be under limit, got {} bytes",
            cache.size_bytes()
        );
    }

    #[tokio::test]
    async fn test_memory_cache_statistics() {
        let cache = MemoryCache::new(1_000_000);
        cache.put("a".to_string(), Blob(vec![1])).await;

        cache.get("a").await;
        cache.get("a").await;
        cache.get("b").await;

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_memory_cache_replace_existing() {
        let cache = MemoryCache::new(1_000_000);
        cache.put("a".to_string(), Blob(vec![1, 2, 3])).await;
        cache.put("a".to_string(), Blob(vec![4, 5])).await;

        assert_eq!(cache.get("a").await, Some(Blob(vec![4, 5])));
    }

    #[test]
    fn test_arc_weight_delegates() {
        let blob = Arc::new(Blob(vec![0; 42]));
        assert_eq!(blob.weight(), 42);
    }
}
