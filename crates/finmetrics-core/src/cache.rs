//! Cache trait for memoizing derived analytics.
//!
//! This module defines the [`AnalyticsCache`] trait and the [`CacheKey`] used to
//! address entries. The engine itself is pure and never caches; callers that
//! want memoization wrap it with an explicit cache keyed by an input hash.

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::error::Result;

/// Address of a cached value: an operation namespace plus a hash of its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    digest: u64,
}

impl CacheKey {
    /// Creates a key from a namespace and a precomputed digest.
    #[must_use]
    pub fn new(namespace: impl Into<String>, digest: u64) -> Self {
        Self {
            namespace: namespace.into(),
            digest,
        }
    }

    /// Derives a key by hashing the JSON serialization of `inputs`.
    ///
    /// Floats have no `Hash` impl, so inputs are hashed through their
    /// serialized form; equal inputs always produce equal keys.
    ///
    /// # Errors
    /// Returns an error if `inputs` cannot be serialized.
    pub fn for_inputs<T: Serialize + ?Sized>(
        namespace: impl Into<String>,
        inputs: &T,
    ) -> Result<Self> {
        let bytes = serde_json::to_vec(inputs)?;
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Ok(Self::new(namespace, hasher.finish()))
    }

    /// Operation namespace, e.g. `"series_report"`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Input digest.
    #[must_use]
    pub const fn digest(&self) -> u64 {
        self.digest
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:016x}", self.namespace, self.digest)
    }
}

/// Trait for caching derived analytics results.
///
/// Values are stored as JSON so a single backend can hold every result type.
/// Implementations must be safe to share across threads.
pub trait AnalyticsCache: Send + Sync + Debug {
    /// Retrieves a cached value.
    ///
    /// Returns `Ok(Some(value))` if cached, `Ok(None)` if not cached.
    fn get(&self, key: &CacheKey) -> Result<Option<serde_json::Value>>;

    /// Stores a value, replacing any previous entry for the key.
    fn put(&self, key: &CacheKey, value: serde_json::Value) -> Result<()>;

    /// Removes entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    fn clear(&self) -> Result<()>;
}
