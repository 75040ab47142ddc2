#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finmetrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for financial series analytics.
//!
//! This crate provides the foundational abstractions shared by the engine:
//!
//! - [`PeriodSeries`](types::PeriodSeries) - Ordered period records, most recent first
//! - [`AnalyticsConfig`](config::AnalyticsConfig) - Windows, thresholds and benchmark ranges
//! - [`AnalyticsCache`](cache::AnalyticsCache) - Explicit memoization abstraction
//! - [`series_from_frame`](frame::series_from_frame) - DataFrame interchange

/// Cache trait and keys for memoizing derived results.
pub mod cache;
/// Engine configuration.
pub mod config;
/// Error types for analytics operations.
pub mod error;
/// Polars DataFrame interchange.
pub mod frame;
/// Reporting period definitions.
pub mod frequency;
/// Core data types (Metric, PeriodRecord, PeriodSeries).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{AnalyticsCache, CacheKey};
pub use config::{
    AnalyticsConfig, BenchmarkMetric, BenchmarkRange, BenchmarkTable, RatingThresholds,
    StabilityConfig,
};
pub use error::{AnalyticsError, Result};
pub use frame::{frame_from_series, series_from_frame};
pub use frequency::PeriodType;
pub use types::{Metric, PeriodRecord, PeriodSeries};
