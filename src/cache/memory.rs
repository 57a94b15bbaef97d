//! In-memory cache implementation using moka
//!
//! Values are stored as JSON so one cache can hold any serializable type.
//! Every entry expires after the cache's configured TTL.

use anyhow::{Context, Result};
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 1_000;

/// Default TTL for cache entries (5 minutes)
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache entry wrapper that stores serialized JSON data
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// In-memory cache using moka
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(default_ttl)
            .build();

        Self { cache, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Get a value; `Ok(None)` when missing or expired
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Insert or overwrite a value
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry::new(value)?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    pub async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Delete every key starting with `prefix`
    pub async fn delete_prefix(&self, prefix: &str) {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys {
            self.cache.invalidate(&key).await;
        }
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// Errors from `fetch` are returned and nothing is cached.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => tracing::warn!("Discarding unreadable cache entry {}: {}", key, e),
        }

        let value = fetch().await?;
        if let Err(e) = self.set(key, &value).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
        Ok(value)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache.set("key1", &"value1".to_string()).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));

        let missing: Option<String> = cache.get("nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_complex_type() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Topic {
            title: String,
            keywords: Vec<String>,
        }

        let cache = MemoryCache::new();
        let topic = Topic {
            title: "AI tools".into(),
            keywords: vec!["ai".into(), "tools".into()],
        };
        cache.set("topic", &topic).await.unwrap();

        let got: Option<Topic> = cache.get("topic").await.unwrap();
        assert_eq!(got, Some(topic));
    }

    #[tokio::test]
    async fn test_delete_and_prefix() {
        let cache = MemoryCache::new();
        cache.set("search:a", &1).await.unwrap();
        cache.set("search:b", &2).await.unwrap();
        cache.set("trending:a", &3).await.unwrap();

        cache.delete("search:a").await;
        assert!(cache.get::<i32>("search:a").await.unwrap().is_none());

        cache.delete_prefix("search:").await;
        assert!(cache.get::<i32>("search:b").await.unwrap().is_none());
        assert_eq!(cache.get::<i32>("trending:a").await.unwrap(), Some(3));

        cache.clear().await;
        assert!(cache.get::<i32>("trending:a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = MemoryCache::with_capacity_and_ttl(10, Duration::from_millis(50));
        cache.set("short", &"lived").await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        let result: Option<String> = cache.get("short").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_success_only() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<String, String> = cache
                .get_or_fetch("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("fresh".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "fresh");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let failed: Result<String, String> = cache
            .get_or_fetch("err", || async { Err("boom".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(cache.get::<String>("err").await.unwrap().is_none());
    }
}
