//! Configuration for the analytics engine.
//!
//! Every threshold the engine uses can be overridden here, and industry ranges
//! are injected through [`BenchmarkTable`] rather than baked into the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AnalyticsError, Result};

/// Default trailing window for trend regression.
pub const DEFAULT_TREND_WINDOW: usize = 6;
/// Default deviation threshold, in standard deviations, for variance points.
pub const DEFAULT_VARIANCE_THRESHOLD: f64 = 1.5;
/// Default rolling window for the consistency score.
pub const DEFAULT_ROLLING_WINDOW: usize = 3;

/// Coefficient-of-variation cut-offs for the four stability tiers.
///
/// A CV at or below `excellent` rates excellent, at or below `good` rates good,
/// at or below `fair` rates fair, anything above rates poor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingThresholds {
    /// Upper CV bound for an excellent rating.
    pub excellent: f64,
    /// Upper CV bound for a good rating.
    pub good: f64,
    /// Upper CV bound for a fair rating.
    pub fair: f64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.1,
            good: 0.2,
            fair: 0.3,
        }
    }
}

impl RatingThresholds {
    /// Checks the thresholds are finite, non-negative and increasing.
    ///
    /// # Errors
    /// Returns [`AnalyticsError::InvalidParameter`] otherwise.
    pub fn validate(&self) -> Result<()> {
        let all = [self.excellent, self.good, self.fair];
        if all.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(AnalyticsError::invalid(
                "rating_thresholds",
                "must be finite and non-negative",
            ));
        }
        if !(self.excellent <= self.good && self.good <= self.fair) {
            return Err(AnalyticsError::invalid(
                "rating_thresholds",
                "must satisfy excellent <= good <= fair",
            ));
        }
        Ok(())
    }
}

/// Settings for the stability analyzer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StabilityConfig {
    /// Window length for the rolling-variance consistency score.
    pub rolling_window: usize,
    /// Rating cut-offs.
    pub thresholds: RatingThresholds,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            thresholds: RatingThresholds::default(),
        }
    }
}

/// A margin or ratio that can be compared against an industry range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BenchmarkMetric {
    /// Gross margin.
    GrossMargin,
    /// Operating margin.
    OperatingMargin,
    /// Net margin.
    NetMargin,
    /// Cash-flow margin.
    CashFlowMargin,
    /// Return on equity.
    ReturnOnEquity,
    /// Return on assets.
    ReturnOnAssets,
    /// Asset turnover.
    AssetTurnover,
    /// Debt to equity.
    DebtToEquity,
    /// Interest coverage.
    InterestCoverage,
    /// Cash conversion.
    CashConversion,
}

/// Inclusive typical range for a benchmarked metric.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRange {
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl BenchmarkRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Returns true if `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Industry or sector ranges supplied by the caller.
///
/// Empty by default so the engine carries no particular taxonomy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkTable {
    ranges: BTreeMap<BenchmarkMetric, BenchmarkRange>,
}

impl BenchmarkTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the range for a metric.
    #[must_use]
    pub fn with_range(mut self, metric: BenchmarkMetric, low: f64, high: f64) -> Self {
        self.ranges.insert(metric, BenchmarkRange::new(low, high));
        self
    }

    /// Returns the range for a metric, if configured.
    #[must_use]
    pub fn range(&self, metric: BenchmarkMetric) -> Option<BenchmarkRange> {
        self.ranges.get(&metric).copied()
    }

    /// Returns true if no ranges are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates over configured ranges.
    pub fn iter(&self) -> impl Iterator<Item = (BenchmarkMetric, BenchmarkRange)> + '_ {
        self.ranges.iter().map(|(m, r)| (*m, *r))
    }

    /// Checks every range is finite and not inverted.
    ///
    /// # Errors
    /// Returns [`AnalyticsError::InvalidParameter`] naming the first bad range.
    pub fn validate(&self) -> Result<()> {
        for (metric, range) in &self.ranges {
            if !range.low.is_finite() || !range.high.is_finite() || range.low > range.high {
                return Err(AnalyticsError::invalid(
                    format!("benchmarks.{metric:?}"),
                    format!("invalid range [{}, {}]", range.low, range.high),
                ));
            }
        }
        Ok(())
    }
}

/// Engine-wide configuration.
///
/// # Example
///
/// ```
/// use finmetrics_core::AnalyticsConfig;
///
/// let config = AnalyticsConfig::from_json(r#"{ "trendWindow": 8 }"#).unwrap();
/// assert_eq!(config.trend_window, 8);
/// assert_eq!(config.short_ma_period, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    /// Trailing window for trend regression; reversal windows use half of it.
    pub trend_window: usize,
    /// Period of the short moving average.
    pub short_ma_period: usize,
    /// Period of the long moving average.
    pub long_ma_period: usize,
    /// Deviation threshold, in standard deviations, for variance points.
    pub variance_threshold: f64,
    /// Stability analyzer settings.
    pub stability: StabilityConfig,
    /// Injected industry ranges.
    pub benchmarks: BenchmarkTable,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            short_ma_period: 3,
            long_ma_period: 6,
            variance_threshold: DEFAULT_VARIANCE_THRESHOLD,
            stability: StabilityConfig::default(),
            benchmarks: BenchmarkTable::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Parses a configuration from JSON; absent fields take their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the values fail [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the trend window.
    #[must_use]
    pub fn with_trend_window(mut self, window: usize) -> Self {
        self.trend_window = window;
        self
    }

    /// Sets the short and long moving-average periods.
    #[must_use]
    pub fn with_ma_periods(mut self, short: usize, long: usize) -> Self {
        self.short_ma_period = short;
        self.long_ma_period = long;
        self
    }

    /// Sets the variance-point threshold.
    #[must_use]
    pub fn with_variance_threshold(mut self, threshold: f64) -> Self {
        self.variance_threshold = threshold;
        self
    }

    /// Sets the stability settings.
    #[must_use]
    pub fn with_stability(mut self, stability: StabilityConfig) -> Self {
        self.stability = stability;
        self
    }

    /// Sets the benchmark table.
    #[must_use]
    pub fn with_benchmarks(mut self, benchmarks: BenchmarkTable) -> Self {
        self.benchmarks = benchmarks;
        self
    }

    /// Checks every setting is usable.
    ///
    /// # Errors
    /// Returns [`AnalyticsError::InvalidParameter`] for the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.trend_window < 3 {
            return Err(AnalyticsError::invalid("trend_window", "must be at least 3"));
        }
        if self.short_ma_period == 0 {
            return Err(AnalyticsError::invalid("short_ma_period", "must be at least 1"));
        }
        if self.short_ma_period >= self.long_ma_period {
            return Err(AnalyticsError::invalid(
                "short_ma_period",
                "must be less than long_ma_period",
            ));
        }
        if !self.variance_threshold.is_finite() || self.variance_threshold < 0.0 {
            return Err(AnalyticsError::invalid(
                "variance_threshold",
                "must be finite and non-negative",
            ));
        }
        if self.stability.rolling_window < 2 {
            return Err(AnalyticsError::invalid(
                "stability.rolling_window",
                "must be at least 2",
            ));
        }
        self.stability.thresholds.validate()?;
        self.benchmarks.validate()
    }
}
