#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finmetrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Unified entry point for financial series analytics.
//!
//! This crate re-exports the core types and the analytics engine, and
//! provides a [`SeriesAnalyzer`] that builds complete reports for a series
//! with optional memoization through an [`AnalyticsCache`].

/// Report orchestration over the analytics engine.
pub mod analyzer;
/// DataFrame rendering of derived results.
pub mod frame;

// Core types and traits
pub use finmetrics_core::*;

// Engine
pub use finmetrics_analytics as analytics;
pub use finmetrics_analytics::*;

// Cache implementations
#[cfg(feature = "cache")]
pub use finmetrics_cache::{InMemoryCache, NoopCache};

pub use analyzer::{MarginReport, SeriesAnalyzer, SeriesReport};
pub use frame::ttm_frame;
