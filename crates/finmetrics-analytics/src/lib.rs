#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finmetrics/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Pure analytics over periodic financial series.
//!
//! Every function here is synchronous and side-effect free. Short histories
//! and zero denominators never produce errors: results carry zeros, documented
//! sentinels and a `sufficient_data` flag instead.
//!
//! # Example
//!
//! ```
//! use finmetrics_analytics::{cagr, trend_analysis, TrendDirection};
//!
//! assert!((cagr(121.0, 100.0, 2.0) - 0.1).abs() < 1e-12);
//! assert_eq!(trend_analysis(&[1.0, 2.0, 3.0, 4.0], 4).direction, TrendDirection::Up);
//! ```

/// Classification against injected industry ranges.
pub mod benchmark;
/// Cash burn and runway.
pub mod burn;
/// Compound annual growth rates.
pub mod cagr;
/// Pearson correlation and margin alignment.
pub mod correlation;
/// Simple moving averages and crossovers.
pub mod moving_average;
/// Phase bands and business-cycle labels.
pub mod phase;
/// Variance, deviation points and stability scores.
pub mod stability;
/// Descriptive statistics and least squares.
pub mod stats;
/// Trend regression, reversals and projection.
pub mod trend;
/// Trailing-twelve-month aggregation.
pub mod ttm;
/// Series validation.
pub mod validate;

pub use benchmark::{BenchmarkPosition, BenchmarkReading, classify_ttm};
pub use burn::{BurnAnalysis, Runway, burn_analysis};
pub use cagr::{
    CagrResult, CagrTrend, GrowthAcceleration, GrowthConsistency, HorizonCagr, cagr,
    cagr_for_horizons, cagr_for_periods, cagr_trend, format_cagr,
};
pub use correlation::{
    Alignment, MarginAlignment, margin_alignment, margin_trend_alignment, pearson_correlation,
};
pub use moving_average::{
    Crossover, CrossoverKind, MovingAverageCrossover, detect_crossovers, moving_average,
    moving_average_crossover,
};
pub use phase::{CyclePhase, PhaseBand, classify_cycle_phases, segment_phases};
pub use stability::{
    CycleImpact, CyclicalImpact, DeviationKind, MarginKind, StabilityRating, StabilityResult,
    VariancePoint, VarianceStats, business_cycle_impact, identify_variance_points,
    stability_metrics, stability_metrics_with, variance_stats,
};
pub use trend::{
    Reversal, ReversalKind, Significance, TrendDirection, TrendResult, TrendStrength,
    detect_reversals, project_next, rolling_slopes, trend_analysis,
};
pub use ttm::{
    MetricGrowth, RollingTtm, TtmGrowth, TtmMargins, TtmRatios, TtmResult, TtmSum,
    rolling_ttm_series, ttm, ttm_growth, ttm_margins, ttm_metric_growth, ttm_ratios, ttm_sum,
};
pub use validate::{SeriesValidator, ValidationReport, index_step, validate_series, window_gaps};
