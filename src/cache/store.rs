//! In-memory TTL cache with lazy eviction
//!
//! Entries expire on read: `get` removes an entry whose deadline has passed
//! and reports it absent. There is no background sweep and no size bound.
//! Construct one instance per consumer and pass it where needed; tests get
//! a fresh cache per case.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Mutex-guarded key/value store with per-entry TTL
pub struct ApiCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Default for ApiCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

impl ApiCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Get a stored value if present and unexpired.
    ///
    /// An expired entry is removed before reporting absence.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value, overwriting any existing entry for the key.
    ///
    /// `None` falls back to the cache's default TTL.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove all entries, or only those whose key matches `pattern`.
    ///
    /// Used for targeted invalidation after a mutating operation
    /// (e.g. `clear(Some("^boletines_"))`). Returns the number removed.
    pub fn clear(&self, pattern: Option<&str>) -> Result<usize> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match pattern {
            None => {
                let removed = entries.len();
                entries.clear();
                Ok(removed)
            }
            Some(pat) => {
                let regex = Regex::new(pat)
                    .map_err(|e| CacheError::InvalidPattern(e.to_string()))?;
                let before = entries.len();
                entries.retain(|key, _| !regex.is_match(key));
                Ok(before - entries.len())
            }
        }
    }

    /// Number of entries currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed read through a serde round-trip
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Typed write; serialization failures drop the entry silently, a
    /// cache miss later is the worst outcome.
    pub fn set_as<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        if let Ok(json) = serde_json::to_value(value) {
            self.set(key, json, ttl);
        }
    }

    /// Cache-or-execute orchestration: a hit short-circuits without
    /// invoking `request_fn`; a miss executes it and populates the cache.
    ///
    /// Retries are the caller's concern, composed around `request_fn`.
    /// Concurrent misses on the same key are not deduplicated: each call
    /// executes independently and the last write wins.
    pub async fn cached<T, F, Fut>(&self, key: &str, ttl: Duration, request_fn: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get_as::<T>(key) {
            log::debug!("Cache hit: {}", key);
            return Ok(hit);
        }

        let result = request_fn().await?;
        self.set_as(key, &result, Some(ttl));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_cache() -> ApiCache {
        ApiCache::new(Duration::from_secs(60))
    }

    #[test]
    fn test_set_get() {
        let cache = test_cache();
        cache.set("k1", json!({"a": 1}), None);

        assert_eq!(cache.get("k1"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_expired_entry_absent_and_removed() {
        let cache = test_cache();

        // Zero TTL: immediately expired
        cache.set("k1", json!(1), Some(Duration::from_secs(0)));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get("k1"), None);
        // Lazy eviction removed it from storage
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = test_cache();
        cache.set("k1", json!("old"), None);
        cache.set("k1", json!("new"), None);

        assert_eq!(cache.get("k1"), Some(json!("new")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_all() {
        let cache = test_cache();
        cache.set("a", json!(1), None);
        cache.set("b", json!(2), None);

        let removed = cache.clear(None).unwrap();
        assert_eq!(removed, 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_pattern() {
        let cache = test_cache();
        cache.set("news_search:aaa", json!(1), None);
        cache.set("news_search:bbb", json!(2), None);
        cache.set("news_sources:ccc", json!(3), None);

        let removed = cache.clear(Some("^news_search:")).unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get("news_sources:ccc").is_some());
    }

    #[test]
    fn test_clear_invalid_pattern() {
        let cache = test_cache();
        assert!(cache.clear(Some("[unclosed")).is_err());
    }

    #[test]
    fn test_typed_round_trip() {
        let cache = test_cache();
        cache.set_as("k", &vec![1u32, 2, 3], None);

        let back: Option<Vec<u32>> = cache.get_as("k");
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_cached_hit_skips_request_fn() {
        let cache = test_cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Vec<u32> = cache
                .cached("k", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2])
                })
                .await
                .unwrap();
            assert_eq!(result, vec![1, 2]);
        }

        // Second call was served from cache
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_miss_after_expiry_reexecutes() {
        let cache = test_cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: u32 = cache
                .cached("k", Duration::from_secs(0), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_error_not_stored() {
        let cache = test_cache();

        let result: Result<u32> = cache
            .cached("k", Duration::from_secs(60), || async {
                Err(crate::error::Error::Other("boom".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
