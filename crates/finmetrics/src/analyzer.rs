//! Report orchestration with optional memoization.

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use finmetrics_analytics::{
    BenchmarkReading, CagrResult, CycleImpact, CyclePhase, MarginAlignment,
    MovingAverageCrossover, PhaseBand, Reversal, StabilityResult, TrendResult, TtmResult,
    ValidationReport, VariancePoint, business_cycle_impact, cagr_for_periods,
    classify_cycle_phases, classify_ttm, detect_reversals, identify_variance_points,
    margin_alignment, margin_trend_alignment, moving_average_crossover, segment_phases,
    stability_metrics_with, trend::MIN_TREND_POINTS, trend_analysis, ttm,
    validate::SeriesValidator,
};
use finmetrics_core::{
    AnalyticsCache, AnalyticsConfig, CacheKey, Metric, PeriodSeries, PeriodType, Result,
};

const SERIES_REPORT_NAMESPACE: &str = "series_report";
const MARGIN_REPORT_NAMESPACE: &str = "margin_report";

/// Every derived view of one metric of a series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesReport {
    /// Metric the report describes.
    pub metric: Metric,
    /// Period labels, oldest first; index-aligned with the chronological views.
    pub labels: Vec<String>,
    /// Ordering, gap and completeness checks.
    pub validation: ValidationReport,
    /// Latest TTM window; only computed for quarterly series.
    pub ttm: Option<TtmResult>,
    /// Growth over the standard horizons.
    pub cagr: CagrResult,
    /// Short and long moving averages with their crossovers.
    pub moving_averages: MovingAverageCrossover,
    /// Stability scores and rating.
    pub stability: StabilityResult,
    /// Values beyond the configured deviation threshold.
    pub variance_points: Vec<VariancePoint>,
    /// Trend over the configured trailing window.
    pub trend: TrendResult,
    /// Direction changes across the series.
    pub reversals: Vec<Reversal>,
}

/// Margin behavior of a series across the business cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginReport {
    /// Period labels, oldest first.
    pub labels: Vec<String>,
    /// Gross margin per period, oldest first.
    pub gross: Vec<f64>,
    /// Operating margin per period, oldest first.
    pub operating: Vec<f64>,
    /// Net margin per period, oldest first.
    pub net: Vec<f64>,
    /// Cyclical sensitivity of the three margins.
    pub cycle_impact: CycleImpact,
    /// Correlation of margin levels.
    pub alignment: MarginAlignment,
    /// Correlation of rolling margin trends.
    pub trend_alignment: MarginAlignment,
    /// Latest TTM margins and ratios against the configured ranges; empty for
    /// annual series.
    pub benchmarks: Vec<BenchmarkReading>,
    /// Revenue growth phases; indices refer to `labels`.
    pub phases: Vec<PhaseBand<CyclePhase>>,
}

/// Builds reports over a [`PeriodSeries`] with an optional cache in front.
///
/// The analyzer holds only configuration and the cache handle; each report is
/// computed from its explicit inputs. With a cache configured, reports are
/// looked up by a hash of the series, metric and configuration before being
/// computed, and stored afterwards. Cache failures are logged and never fail
/// the computation.
///
/// # Example
///
/// ```
/// use finmetrics::{Metric, PeriodSeries, PeriodType, SeriesAnalyzer, TrendDirection};
///
/// let margins = [31.0, 30.0, 29.0, 28.0, 27.0, 26.0];
/// let series = PeriodSeries::from_values(Metric::Revenue, &margins, PeriodType::Annual);
///
/// let report = SeriesAnalyzer::new().analyze(&series, &Metric::Revenue).unwrap();
/// assert_eq!(report.trend.direction, TrendDirection::Up);
/// assert!(report.ttm.is_none());
/// ```
#[derive(Default)]
pub struct SeriesAnalyzer {
    config: AnalyticsConfig,
    cache: Option<Arc<dyn AnalyticsCache>>,
}

impl std::fmt::Debug for SeriesAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesAnalyzer")
            .field("config", &self.config)
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .finish()
    }
}

impl SeriesAnalyzer {
    /// Create an analyzer with the default configuration and no cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with a validated configuration.
    ///
    /// # Errors
    /// Returns [`AnalyticsError::InvalidParameter`](finmetrics_core::AnalyticsError::InvalidParameter)
    /// if the configuration is out of range.
    pub fn with_config(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: None,
        })
    }

    /// Create an analyzer with a cache and the default configuration.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn AnalyticsCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the cache for this analyzer.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn AnalyticsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Builds the full report for `metric`.
    ///
    /// # Errors
    /// Returns an error only if the cache key cannot be derived from the
    /// inputs.
    #[instrument(skip(self, series, metric), fields(metric = %metric, records = series.len()))]
    pub fn analyze(&self, series: &PeriodSeries, metric: &Metric) -> Result<SeriesReport> {
        self.memoized(SERIES_REPORT_NAMESPACE, &(series, metric), || {
            self.series_report(series, metric)
        })
    }

    /// Builds the margin report of `series`.
    ///
    /// Margins are profit over revenue per period, 0 where revenue is 0.
    ///
    /// # Errors
    /// Returns an error only if the cache key cannot be derived from the
    /// inputs.
    #[instrument(skip(self, series), fields(records = series.len()))]
    pub fn margin_report(&self, series: &PeriodSeries) -> Result<MarginReport> {
        self.memoized(MARGIN_REPORT_NAMESPACE, series, || self.margins(series))
    }

    fn series_report(&self, series: &PeriodSeries, metric: &Metric) -> SeriesReport {
        let config = &self.config;
        let values = series.chronological(metric);
        let ttm = (series.period_type() == PeriodType::Quarterly).then(|| ttm(series));

        SeriesReport {
            metric: metric.clone(),
            labels: series.chronological_labels(),
            validation: SeriesValidator::new().require(metric.clone()).validate(series),
            ttm,
            cagr: cagr_for_periods(series, metric, series.period_type()),
            moving_averages: moving_average_crossover(
                &values,
                config.short_ma_period,
                config.long_ma_period,
            ),
            stability: stability_metrics_with(&values, &config.stability),
            variance_points: identify_variance_points(&values, config.variance_threshold),
            trend: trend_analysis(&values, config.trend_window),
            reversals: detect_reversals(&values, self.reversal_window()),
        }
    }

    fn margins(&self, series: &PeriodSeries) -> MarginReport {
        let revenue = series.chronological(&Metric::Revenue);
        let margin = |profit: Metric| -> Vec<f64> {
            series
                .chronological(&profit)
                .iter()
                .zip(&revenue)
                .map(|(p, r)| if *r == 0.0 { 0.0 } else { p / r })
                .collect()
        };
        let gross = margin(Metric::GrossProfit);
        let operating = margin(Metric::OperatingProfit);
        let net = margin(Metric::NetProfit);

        let benchmarks = if series.period_type() == PeriodType::Quarterly {
            classify_ttm(&ttm(series), &self.config.benchmarks)
        } else {
            Vec::new()
        };

        MarginReport {
            labels: series.chronological_labels(),
            cycle_impact: business_cycle_impact(&gross, &operating, &net),
            alignment: margin_alignment(&gross, &operating, &net),
            trend_alignment: margin_trend_alignment(
                &gross,
                &operating,
                &net,
                self.reversal_window(),
            ),
            benchmarks,
            phases: growth_phases(&revenue),
            gross,
            operating,
            net,
        }
    }

    /// Window of each side of a reversal comparison: half the trend window,
    /// never below the minimum trend length.
    fn reversal_window(&self) -> usize {
        (self.config.trend_window / 2).max(MIN_TREND_POINTS)
    }

    fn memoized<I, T, F>(&self, namespace: &str, inputs: &I, compute: F) -> Result<T>
    where
        I: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let Some(cache) = &self.cache else {
            return Ok(compute());
        };

        let key = CacheKey::for_inputs(namespace, &(inputs, &self.config))?;
        match cache.get(&key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(cached) => {
                    debug!(key = %key, "Cache hit for report");
                    return Ok(cached);
                }
                Err(e) => warn!(key = %key, error = %e, "Discarding undecodable cached report"),
            },
            Ok(None) => debug!(key = %key, "Cache miss for report"),
            Err(e) => warn!(key = %key, error = %e, "Cache lookup failed"),
        }

        let report = compute();
        match serde_json::to_value(&report) {
            Ok(value) => {
                if let Err(e) = cache.put(&key, value) {
                    warn!(key = %key, error = %e, "Failed to cache report");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize report for caching"),
        }
        Ok(report)
    }
}

/// Labels period-over-period growth of an oldest-first series and bands the
/// labels, shifting indices so they refer to the input periods.
fn growth_phases(values: &[f64]) -> Vec<PhaseBand<CyclePhase>> {
    let growth: Vec<f64> = values
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0].abs() })
        .collect();
    let labels = classify_cycle_phases(&growth);
    segment_phases(&labels, Some(&growth))
        .into_iter()
        .map(|band| PhaseBand {
            start: band.start + 1,
            end: band.end + 1,
            ..band
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use finmetrics_analytics::{BenchmarkPosition, CyclicalImpact, TrendDirection};
    use finmetrics_core::{BenchmarkMetric, BenchmarkTable, PeriodRecord};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn quarterly_series() -> PeriodSeries {
        let revenue = [963.0, 830.0, 750.0, 680.0, 640.0, 600.0, 575.0, 540.0];
        let records = revenue
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let index = 8 - i as i64;
                PeriodRecord::new(format!("Q{index}"), index)
                    .with_metric(Metric::Revenue, r)
                    .with_metric(Metric::GrossProfit, r * 0.4)
                    .with_metric(Metric::OperatingProfit, r * 0.2)
                    .with_metric(Metric::NetProfit, r * 0.1)
            })
            .collect();
        PeriodSeries::new(records, PeriodType::Quarterly)
    }

    #[test]
    fn test_analyze_quarterly_series() {
        let series = quarterly_series();
        let report = SeriesAnalyzer::new()
            .analyze(&series, &Metric::Revenue)
            .unwrap();

        assert_eq!(report.labels.first().map(String::as_str), Some("Q1"));
        assert_eq!(report.labels.last().map(String::as_str), Some("Q8"));
        assert!(report.validation.is_valid);

        let ttm = report.ttm.unwrap();
        assert_eq!(ttm.revenue, 3223.0);
        assert!(ttm.growth.is_some());

        assert!(approx(report.cagr.one_year, 963.0 / 640.0 - 1.0));
        assert_eq!(report.cagr.three_year, 0.0);
        assert_eq!(report.moving_averages.short.len(), 8);
        assert_eq!(report.trend.direction, TrendDirection::Up);
        assert!(report.reversals.is_empty());
    }

    #[test]
    fn test_annual_series_has_no_ttm() {
        let series =
            PeriodSeries::from_values(Metric::NetProfit, &[5.0, 4.0, 3.0], PeriodType::Annual);
        let report = SeriesAnalyzer::new()
            .analyze(&series, &Metric::NetProfit)
            .unwrap();
        assert!(report.ttm.is_none());
        assert!(approx(report.cagr.one_year, 0.25));
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = AnalyticsConfig::default().with_trend_window(2);
        assert!(SeriesAnalyzer::with_config(config).is_err());

        let config = AnalyticsConfig::default().with_trend_window(8);
        let analyzer = SeriesAnalyzer::with_config(config).unwrap();
        assert_eq!(analyzer.config().trend_window, 8);
        assert_eq!(analyzer.reversal_window(), 4);
        assert_eq!(SeriesAnalyzer::new().reversal_window(), 3);
    }

    #[test]
    fn test_margin_report() {
        let table = BenchmarkTable::new().with_range(BenchmarkMetric::GrossMargin, 0.3, 0.5);
        let config = AnalyticsConfig::default().with_benchmarks(table);
        let analyzer = SeriesAnalyzer::with_config(config).unwrap();
        let report = analyzer.margin_report(&quarterly_series()).unwrap();

        assert_eq!(report.gross.len(), 8);
        assert!(report.gross.iter().all(|m| approx(*m, 0.4)));
        assert_eq!(report.cycle_impact.impact, CyclicalImpact::Low);

        assert_eq!(report.benchmarks.len(), 1);
        assert_eq!(report.benchmarks[0].position, BenchmarkPosition::Within);

        // growth: +6.5%, +4.3%, +6.7%, +6.3%, +10.3%, +10.7%, +16.0%
        assert_eq!(report.phases.len(), 5);
        assert_eq!(report.phases[0].start, 1);
        assert_eq!(report.phases[1].label, CyclePhase::Peak);
        let last = report.phases.last().unwrap();
        assert_eq!((last.start, last.end), (5, 7));
        assert_eq!(last.label, CyclePhase::Expansion);
    }

    #[test]
    fn test_margin_report_annual_skips_benchmarks() {
        let table = BenchmarkTable::new().with_range(BenchmarkMetric::GrossMargin, 0.3, 0.5);
        let analyzer =
            SeriesAnalyzer::with_config(AnalyticsConfig::default().with_benchmarks(table)).unwrap();
        let annual = PeriodSeries::new(quarterly_series().into_inner(), PeriodType::Annual);
        let report = analyzer.margin_report(&annual).unwrap();
        assert!(report.benchmarks.is_empty());
    }

    #[test]
    fn test_growth_phases_zero_base() {
        let phases = growth_phases(&[0.0, 10.0, 12.0]);
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].label, CyclePhase::Trough);
        assert_eq!((phases[1].start, phases[1].end), (2, 2));
        assert!(growth_phases(&[5.0]).is_empty());
    }

    #[test]
    fn test_analyzer_debug() {
        let analyzer = SeriesAnalyzer::new();
        let debug = format!("{analyzer:?}");
        assert!(debug.contains("SeriesAnalyzer"));
        assert!(debug.contains("cache: None"));
    }

    #[cfg(feature = "cache")]
    mod memoization {
        use super::*;
        use finmetrics_cache::InMemoryCache;
        use serde_json::json;

        fn report_key(
            analyzer: &SeriesAnalyzer,
            series: &PeriodSeries,
            metric: &Metric,
        ) -> CacheKey {
            CacheKey::for_inputs(
                SERIES_REPORT_NAMESPACE,
                &(&(series, metric), analyzer.config()),
            )
            .unwrap()
        }

        #[test]
        fn test_report_is_cached() {
            let cache = Arc::new(InMemoryCache::new());
            let analyzer = SeriesAnalyzer::with_cache(cache.clone());
            let series = quarterly_series();

            let first = analyzer.analyze(&series, &Metric::Revenue).unwrap();
            assert_eq!(cache.len().unwrap(), 1);
            let second = analyzer.analyze(&series, &Metric::Revenue).unwrap();
            assert_eq!(cache.len().unwrap(), 1);
            assert_eq!(first.labels, second.labels);
            assert!(approx(first.trend.slope, second.trend.slope));

            analyzer.margin_report(&series).unwrap();
            assert_eq!(cache.len().unwrap(), 2);
        }

        #[test]
        fn test_cached_report_is_returned() {
            let cache = Arc::new(InMemoryCache::new());
            let analyzer = SeriesAnalyzer::new().set_cache(cache.clone());
            let series = quarterly_series();

            let mut planted = SeriesAnalyzer::new()
                .analyze(&series, &Metric::Revenue)
                .unwrap();
            planted.labels = vec!["planted".to_string()];
            let key = report_key(&analyzer, &series, &Metric::Revenue);
            cache.put(&key, serde_json::to_value(&planted).unwrap()).unwrap();

            let report = analyzer.analyze(&series, &Metric::Revenue).unwrap();
            assert_eq!(report.labels, vec!["planted".to_string()]);
        }

        #[test]
        fn test_undecodable_entry_is_recomputed() {
            let cache = Arc::new(InMemoryCache::new());
            let analyzer = SeriesAnalyzer::with_cache(cache.clone());
            let series = quarterly_series();
            let key = report_key(&analyzer, &series, &Metric::Revenue);
            cache.put(&key, json!("not a report")).unwrap();

            let report = analyzer.analyze(&series, &Metric::Revenue).unwrap();
            assert_eq!(report.labels.len(), 8);
            assert!(cache.get(&key).unwrap().unwrap().is_object());
        }

        #[test]
        fn test_config_changes_key() {
            let series = quarterly_series();
            let default = SeriesAnalyzer::new();
            let wide = SeriesAnalyzer::with_config(AnalyticsConfig::default().with_trend_window(8))
                .unwrap();
            assert_ne!(
                report_key(&default, &series, &Metric::Revenue),
                report_key(&wide, &series, &Metric::Revenue)
            );
        }
    }
}
