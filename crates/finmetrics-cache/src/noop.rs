//! No-op cache implementation.

use finmetrics_core::{AnalyticsCache, CacheKey, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `Ok(None)` and `put` always returns `Ok(())`.
/// Useful for disabling memoization or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AnalyticsCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Result<Option<Value>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    fn put(&self, _key: &CacheKey, _value: Value) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_noop_cache_never_hits() {
        let cache = NoopCache::new();
        let key = CacheKey::new("series_report", 1);

        assert!(cache.put(&key, json!({ "cached": true })).is_ok());
        assert!(cache.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_noop_cache_management() {
        let cache = NoopCache::new();

        // invalidate_stale should return 0 (nothing to invalidate)
        let removed = cache.invalidate_stale(Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);

        // clear should succeed
        assert!(cache.clear().is_ok());
    }

    #[test]
    fn test_noop_cache_is_copy() {
        let cache1 = NoopCache::new();
        let cache2 = cache1; // Copy
        let _cache3 = cache2; // Still works because Copy
    }
}
