//! In-memory cache implementation.

use chrono::Utc;
use finmetrics_core::{AnalyticsCache, AnalyticsError, CacheKey, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Process-local cache for derived results.
///
/// Entries live in a `RwLock`-protected `HashMap` and are lost when the cache
/// is dropped. Values are cloned on get.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry<Value>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    ///
    /// # Errors
    /// Returns [`AnalyticsError::Cache`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    /// Returns true if the cache holds no entries.
    ///
    /// # Errors
    /// Returns [`AnalyticsError::Cache`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> AnalyticsError {
    AnalyticsError::Cache(format!("cache lock poisoned: {err}"))
}

impl AnalyticsCache for InMemoryCache {
    #[instrument(skip(self, key), fields(key = %key))]
    fn get(&self, key: &CacheKey) -> Result<Option<Value>> {
        let cache = self.entries.read().map_err(poisoned)?;
        match cache.get(key) {
            Some(entry) => {
                debug!("Cache hit");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, key, value), fields(key = %key))]
    fn put(&self, key: &CacheKey, value: Value) -> Result<()> {
        let mut cache = self.entries.write().map_err(poisoned)?;
        cache.insert(key.clone(), CacheEntry::new(value));
        debug!(entries = cache.len(), "Cached value");
        Ok(())
    }

    #[instrument(skip(self))]
    fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.entries.write().map_err(poisoned)?;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    fn clear(&self) -> Result<()> {
        self.entries.write().map_err(poisoned)?.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}
