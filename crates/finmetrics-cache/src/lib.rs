#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finmetrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache backends for memoized analytics.
//!
//! This crate provides implementations of the [`AnalyticsCache`] trait from `finmetrics-core`:
//!
//! - [`InMemoryCache`] - Process-local cache with TTL-based invalidation
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use finmetrics_core::AnalyticsCache;

// Re-export implementations
pub use memory::InMemoryCache;
pub use noop::NoopCache;
