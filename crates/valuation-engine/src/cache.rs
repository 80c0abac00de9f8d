//! Caching layer for fundamentals to reduce provider calls

use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::market::Fundamentals;

/// Cache key for fundamentals requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Stock symbol
    pub symbol: String,
    /// Provider that produced the data
    pub source: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(symbol: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            source: source.into(),
        }
    }
}

/// Expiration policy for cached fundamentals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachePolicy {
    /// Entries expire after the given lifetime
    Timed(Duration),
    /// Nothing is stored
    Disabled,
}

/// Thread-safe cache for fundamentals
#[derive(Clone)]
pub struct FundamentalsCache {
    cache: Option<Arc<RwLock<TimedCache<CacheKey, Fundamentals>>>>,
}

impl FundamentalsCache {
    /// Create a new cache with the given expiration policy
    pub fn new(policy: CachePolicy) -> Self {
        let cache = match policy {
            CachePolicy::Timed(ttl) => Some(Arc::new(RwLock::new(TimedCache::with_lifespan(ttl)))),
            CachePolicy::Disabled => None,
        };
        Self { cache }
    }

    /// Create a timed cache
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(CachePolicy::Timed(ttl))
    }

    /// Create a cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(CachePolicy::Disabled)
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<Fundamentals> {
        let mut cache = self.cache.as_ref()?.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: Fundamentals) {
        if let Some(cache) = &self.cache {
            let _ = cache.write().await.cache_set(key, value);
        }
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// If the value exists in cache, it's returned immediately.
    /// Otherwise, the fetcher function is called and the result is cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<Fundamentals, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Fundamentals, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for key: {:?}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {:?}", key);

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Some(cache) = &self.cache {
            let _ = cache.write().await.cache_remove(key);
        }
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.write().await.cache_clear();
        }
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.read().await.cache_size(),
            None => 0,
        }
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(symbol: &str, price: f64) -> Fundamentals {
        Fundamentals {
            price: Some(price),
            ..Fundamentals::new(symbol)
        }
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = FundamentalsCache::with_ttl(Duration::from_secs(60));
        let key = CacheKey::new("SMDR", "test");
        let value = sample("SMDR", 350.0);

        cache.insert(key.clone(), value.clone()).await;

        assert_eq!(cache.get(&key).await, Some(value));
        assert_eq!(cache.get(&CacheKey::new("SMDR", "other")).await, None);
    }

    #[tokio::test]
    async fn test_cache_get_or_fetch() {
        let cache = FundamentalsCache::with_ttl(Duration::from_secs(60));
        let key = CacheKey::new("SMDR", "test");
        let value = sample("SMDR", 350.0);

        let mut call_count = 0;
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(call_count, 1);

        // Second call should use cache
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(call_count, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = FundamentalsCache::with_ttl(Duration::from_secs(60));
        let key = CacheKey::new("SMDR", "test");

        let result = cache
            .get_or_fetch(key.clone(), || async { Err::<Fundamentals, _>("offline") })
            .await;
        assert_eq!(result, Err("offline"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = FundamentalsCache::with_ttl(Duration::from_secs(1));
        let key = CacheKey::new("SMDR", "test");

        cache.insert(key.clone(), sample("SMDR", 350.0)).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let cache = FundamentalsCache::disabled();
        let key = CacheKey::new("SMDR", "test");

        let mut call_count = 0;
        for _ in 0..3 {
            cache
                .get_or_fetch(key.clone(), || {
                    call_count += 1;
                    async { Ok::<_, String>(sample("SMDR", 350.0)) }
                })
                .await
                .unwrap();
        }

        assert_eq!(call_count, 3);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_invalidation_and_clear() {
        let cache = FundamentalsCache::with_ttl(Duration::from_secs(60));

        for i in 0..5 {
            let key = CacheKey::new(format!("STOCK{i}"), "test");
            cache.insert(key, sample("STOCK", f64::from(i))).await;
        }
        assert_eq!(cache.len().await, 5);

        cache.invalidate(&CacheKey::new("STOCK0", "test")).await;
        assert_eq!(cache.len().await, 4);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = FundamentalsCache::with_ttl(Duration::from_secs(60));
        let shared = cache.clone();

        shared.insert(CacheKey::new("SMDR", "test"), sample("SMDR", 1.0)).await;
        assert_eq!(cache.len().await, 1);
    }
}
