//! Compound annual growth rates.
//!
//! [`cagr`] handles zero and negative endpoints with fixed sentinel rules so
//! callers never see NaN or infinity. Series helpers measure growth from the
//! most recent record back to the record N years earlier.

use finmetrics_core::{Metric, PeriodRecord, PeriodType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::stats;
use crate::validate::index_step;

/// Year horizons reported by [`cagr_for_periods`].
pub const STANDARD_HORIZONS: [usize; 4] = [1, 3, 5, 10];

/// Acceleration delta above which growth is accelerating (and below whose
/// negation it is decelerating).
const ACCELERATION_BAND: f64 = 0.01;

/// Compound annual growth rate from `start_value` to `end_value` over `years`.
///
/// - both zero: 0
/// - positive start, zero end: exactly -1
/// - equal values: 0
/// - zero start (non-zero end): 0, there is no finite geometric rate
/// - either value negative: the signed relative change `(end - start) / |start|`
///   for a single year, 0 for longer horizons
/// - otherwise `(end / start)^(1 / years) - 1`
///
/// Non-positive or non-finite `years` yield 0.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::cagr::cagr;
///
/// assert!((cagr(121.0, 100.0, 2.0) - 0.1).abs() < 1e-12);
/// assert_eq!(cagr(0.0, 50.0, 3.0), -1.0);
/// assert_eq!(cagr(-20.0, 40.0, 3.0), 0.0);
/// ```
#[must_use]
pub fn cagr(end_value: f64, start_value: f64, years: f64) -> f64 {
    if !years.is_finite() || years <= 0.0 {
        return 0.0;
    }
    if start_value == 0.0 && end_value == 0.0 {
        return 0.0;
    }
    if start_value > 0.0 && end_value == 0.0 {
        return -1.0;
    }
    if start_value == end_value || start_value == 0.0 {
        return 0.0;
    }
    if start_value < 0.0 || end_value < 0.0 {
        return if years == 1.0 {
            (end_value - start_value) / start_value.abs()
        } else {
            0.0
        };
    }
    (end_value / start_value).powf(1.0 / years) - 1.0
}

/// Growth rates at the standard 1, 3, 5 and 10 year horizons.
///
/// A horizon whose start record lies beyond the series reads 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CagrResult {
    /// One-year CAGR.
    pub one_year: f64,
    /// Three-year CAGR.
    pub three_year: f64,
    /// Five-year CAGR.
    pub five_year: f64,
    /// Ten-year CAGR.
    pub ten_year: f64,
}

impl CagrResult {
    /// Values in horizon order (1, 3, 5, 10 years).
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [self.one_year, self.three_year, self.five_year, self.ten_year]
    }
}

/// Growth rate for one arbitrary horizon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonCagr {
    /// Horizon length in years.
    pub years: usize,
    /// Compound annual growth rate, 0 when unavailable.
    pub value: f64,
    /// False when the series is too short for the horizon.
    pub sufficient_data: bool,
    /// False when the base record is not exactly the horizon's period count
    /// before the latest one, so the rate spans a different interval.
    pub contiguous: bool,
}

/// CAGR of `metric` from the latest record back `years` years.
#[must_use]
pub fn horizon_cagr(
    records: &[PeriodRecord],
    metric: &Metric,
    years: usize,
    period_type: PeriodType,
) -> HorizonCagr {
    let offset = period_type.offset_for_years(years);
    match (records.first(), records.get(offset)) {
        (Some(latest), Some(base)) if years > 0 => {
            let step = index_step(latest, base);
            let contiguous = step == offset as i128;
            if !contiguous {
                warn!(
                    metric = %metric,
                    years,
                    expected = offset,
                    actual = %step,
                    "CAGR base period is not aligned with the horizon"
                );
            }
            HorizonCagr {
                years,
                value: cagr(latest.value(metric), base.value(metric), years as f64),
                sufficient_data: true,
                contiguous,
            }
        }
        _ => {
            debug!(
                metric = %metric,
                years,
                available = records.len(),
                "Insufficient history for CAGR horizon"
            );
            HorizonCagr {
                years,
                ..HorizonCagr::default()
            }
        }
    }
}

/// CAGR of `metric` for each requested horizon.
#[must_use]
pub fn cagr_for_horizons(
    records: &[PeriodRecord],
    metric: &Metric,
    horizons: &[usize],
    period_type: PeriodType,
) -> Vec<HorizonCagr> {
    horizons
        .iter()
        .map(|years| horizon_cagr(records, metric, *years, period_type))
        .collect()
}

/// CAGR of `metric` at the standard horizons.
///
/// For an annual series the start records sit at offsets 1, 3, 5 and 10 from
/// the latest; quarterly series scale the offsets by four.
#[must_use]
pub fn cagr_for_periods(
    records: &[PeriodRecord],
    metric: &Metric,
    period_type: PeriodType,
) -> CagrResult {
    let [one, three, five, ten] = STANDARD_HORIZONS
        .map(|years| horizon_cagr(records, metric, years, period_type).value);
    CagrResult {
        one_year: one,
        three_year: three,
        five_year: five,
        ten_year: ten,
    }
}

/// Renders a growth rate as a signed percentage with one decimal.
///
/// Positive values get a `+` prefix; exactly zero renders as `0.0%`.
///
/// ```
/// use finmetrics_analytics::cagr::format_cagr;
///
/// assert_eq!(format_cagr(0.1234), "+12.3%");
/// assert_eq!(format_cagr(-0.05), "-5.0%");
/// assert_eq!(format_cagr(0.0), "0.0%");
/// ```
#[must_use]
pub fn format_cagr(value: f64) -> String {
    if value == 0.0 {
        return "0.0%".to_string();
    }
    let pct = value * 100.0;
    if value > 0.0 {
        format!("+{pct:.1}%")
    } else {
        format!("{pct:.1}%")
    }
}

/// How steady growth has been across CAGR snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrowthConsistency {
    /// Score of at least 0.8.
    Consistent,
    /// Score of at least 0.5.
    Volatile,
    /// Anything lower.
    Irregular,
}

/// Direction of change between short and long horizons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrowthAcceleration {
    /// Shorter horizons grow faster than longer ones.
    Accelerating,
    /// Shorter horizons grow slower than longer ones.
    Decelerating,
    /// Within ±1 percentage point.
    Stable,
}

/// Trend analysis over a history of CAGR snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CagrTrend {
    /// Mean of `max(0, 1 - CV)` over horizons with at least two non-zero values.
    pub consistency_score: f64,
    /// Classification of the consistency score.
    pub consistency: GrowthConsistency,
    /// Mean of the latest 1Y-3Y and 3Y-5Y deltas.
    pub acceleration_score: f64,
    /// Classification of the acceleration score.
    pub acceleration: GrowthAcceleration,
    /// Per-horizon population standard deviation across snapshots.
    pub volatility: CagrResult,
}

/// Analyzes a history of CAGR snapshots, most recent first.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::cagr::{cagr_trend, CagrResult, GrowthAcceleration};
///
/// let latest = CagrResult { one_year: 0.20, three_year: 0.15, five_year: 0.10, ten_year: 0.08 };
/// let trend = cagr_trend(&[latest, latest]);
/// assert_eq!(trend.acceleration, GrowthAcceleration::Accelerating);
/// ```
#[must_use]
pub fn cagr_trend(snapshots: &[CagrResult]) -> CagrTrend {
    let columns: Vec<Vec<f64>> = (0..STANDARD_HORIZONS.len())
        .map(|h| snapshots.iter().map(|s| s.as_array()[h]).collect())
        .collect();

    let scores: Vec<f64> = columns
        .iter()
        .filter_map(|column| {
            let valid: Vec<f64> = column.iter().copied().filter(|v| *v != 0.0).collect();
            if valid.len() < 2 {
                return None;
            }
            Some((1.0 - stats::coefficient_of_variation(&valid)).max(0.0))
        })
        .collect();
    let consistency_score = stats::mean(&scores);
    let consistency = if consistency_score >= 0.8 {
        GrowthConsistency::Consistent
    } else if consistency_score >= 0.5 {
        GrowthConsistency::Volatile
    } else {
        GrowthConsistency::Irregular
    };

    let acceleration_score = snapshots.first().map_or(0.0, |latest| {
        let short_vs_medium = latest.one_year - latest.three_year;
        let medium_vs_long = latest.three_year - latest.five_year;
        (short_vs_medium + medium_vs_long) / 2.0
    });
    let acceleration = if acceleration_score > ACCELERATION_BAND {
        GrowthAcceleration::Accelerating
    } else if acceleration_score < -ACCELERATION_BAND {
        GrowthAcceleration::Decelerating
    } else {
        GrowthAcceleration::Stable
    };

    let volatility = CagrResult {
        one_year: stats::std_dev(&columns[0]),
        three_year: stats::std_dev(&columns[1]),
        five_year: stats::std_dev(&columns[2]),
        ten_year: stats::std_dev(&columns[3]),
    };

    CagrTrend {
        consistency_score,
        consistency,
        acceleration_score,
        acceleration,
        volatility,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::approx;
    use finmetrics_core::PeriodSeries;

    #[test]
    fn test_concrete_ten_percent() {
        assert!(approx(cagr(121.0, 100.0, 2.0), 0.1, 1e-12));
    }

    #[test]
    fn test_no_growth_identity() {
        for x in [-50.0, 0.0, 0.5, 100.0, 1e9] {
            for n in [1.0, 2.0, 3.0, 10.0] {
                assert_eq!(cagr(x, x, n), 0.0, "cagr({x}, {x}, {n})");
            }
        }
    }

    #[test]
    fn test_complete_decline() {
        for s in [0.01, 1.0, 500.0] {
            assert_eq!(cagr(0.0, s, 1.0), -1.0);
            assert_eq!(cagr(0.0, s, 5.0), -1.0);
        }
    }

    #[test]
    fn test_negative_values() {
        assert!(approx(cagr(-50.0, 100.0, 1.0), -1.5, 1e-12));
        assert!(approx(cagr(50.0, -100.0, 1.0), 1.5, 1e-12));
        assert!(approx(cagr(-50.0, -100.0, 1.0), 0.5, 1e-12));
        assert_eq!(cagr(-50.0, 100.0, 3.0), 0.0);
        assert_eq!(cagr(50.0, -100.0, 2.0), 0.0);
    }

    #[test]
    fn test_degenerate_inputs_are_finite() {
        assert_eq!(cagr(100.0, 0.0, 3.0), 0.0);
        assert_eq!(cagr(-100.0, 0.0, 1.0), 0.0);
        assert_eq!(cagr(100.0, 50.0, 0.0), 0.0);
        assert_eq!(cagr(100.0, 50.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_cagr_for_periods_annual() {
        // most recent first: 200 now, 100 one year ago, 50 three years ago
        let values = [200.0, 100.0, 80.0, 50.0];
        let series = PeriodSeries::from_values(Metric::Revenue, &values, PeriodType::Annual);
        let result = cagr_for_periods(&series, &Metric::Revenue, PeriodType::Annual);
        assert!(approx(result.one_year, 1.0, 1e-12));
        assert!(approx(result.three_year, 4f64.powf(1.0 / 3.0) - 1.0, 1e-12));
        assert_eq!(result.five_year, 0.0);
        assert_eq!(result.ten_year, 0.0);
    }

    #[test]
    fn test_horizons_quarterly() {
        let values = [121.0, 118.0, 115.0, 112.0, 110.0, 107.0, 105.0, 102.0, 100.0];
        let series = PeriodSeries::from_values(Metric::Revenue, &values, PeriodType::Quarterly);
        let results =
            cagr_for_horizons(&series, &Metric::Revenue, &[1, 2, 3], PeriodType::Quarterly);
        assert!(approx(results[0].value, 0.1, 1e-12));
        assert!(approx(results[1].value, 0.1, 1e-12));
        assert!(results[1].sufficient_data);
        assert!(!results[2].sufficient_data);
        assert_eq!(results[2].value, 0.0);
        assert!(results[0].contiguous && results[1].contiguous);
    }

    #[test]
    fn test_horizon_over_gap_is_flagged() {
        // FY20 is missing, so the record one step back is two years earlier
        let records = vec![
            PeriodRecord::new("FY22", 22).with_metric(Metric::Revenue, 121.0),
            PeriodRecord::new("FY21", 21).with_metric(Metric::Revenue, 110.0),
            PeriodRecord::new("FY19", 19).with_metric(Metric::Revenue, 100.0),
        ];
        let one = horizon_cagr(&records, &Metric::Revenue, 1, PeriodType::Annual);
        assert!(one.sufficient_data);
        assert!(one.contiguous);

        let two = horizon_cagr(&records, &Metric::Revenue, 2, PeriodType::Annual);
        assert!(two.sufficient_data);
        assert!(!two.contiguous);
        assert!(approx(two.value, 0.1, 1e-12));
    }

    #[test]
    fn test_format() {
        assert_eq!(format_cagr(0.1), "+10.0%");
        assert_eq!(format_cagr(-1.0), "-100.0%");
        assert_eq!(format_cagr(0.0), "0.0%");
        assert_eq!(format_cagr(0.00049), "+0.0%");
    }

    #[test]
    fn test_trend_consistent_and_stable() {
        let snapshot = CagrResult {
            one_year: 0.1,
            three_year: 0.1,
            five_year: 0.1,
            ten_year: 0.0,
        };
        let trend = cagr_trend(&[snapshot, snapshot, snapshot]);
        assert!(approx(trend.consistency_score, 1.0, 1e-12));
        assert_eq!(trend.consistency, GrowthConsistency::Consistent);
        assert_eq!(trend.acceleration, GrowthAcceleration::Stable);
        assert!(approx(trend.volatility.one_year, 0.0, 1e-12));
    }

    #[test]
    fn test_trend_irregular_and_decelerating() {
        let latest = CagrResult {
            one_year: 0.02,
            three_year: 0.10,
            five_year: 0.12,
            ten_year: 0.0,
        };
        let older = CagrResult {
            one_year: 0.30,
            three_year: -0.10,
            five_year: 0.01,
            ten_year: 0.0,
        };
        let trend = cagr_trend(&[latest, older]);
        assert_eq!(trend.acceleration, GrowthAcceleration::Decelerating);
        assert!(approx(trend.acceleration_score, -0.05, 1e-12));
        assert_eq!(trend.consistency, GrowthConsistency::Irregular);
        assert!(approx(trend.volatility.one_year, 0.14, 1e-12));
    }

    #[test]
    fn test_trend_empty_history() {
        let trend = cagr_trend(&[]);
        assert_eq!(trend.consistency_score, 0.0);
        assert_eq!(trend.consistency, GrowthConsistency::Irregular);
        assert_eq!(trend.acceleration, GrowthAcceleration::Stable);
    }
}
