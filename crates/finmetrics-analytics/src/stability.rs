//! Variance, deviation points and stability scoring.
//!
//! All statistics are population statistics. Scores are bounded to 0..=100.

use finmetrics_core::{StabilityConfig, config::DEFAULT_VARIANCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats;

/// Mean, variance and standard deviation of a series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceStats {
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Computes population statistics; an empty slice gives zeros.
#[must_use]
pub fn variance_stats(values: &[f64]) -> VarianceStats {
    let variance = stats::variance(values);
    VarianceStats {
        count: values.len(),
        mean: stats::mean(values),
        variance,
        std_dev: variance.sqrt(),
    }
}

/// Side of the mean a deviation point falls on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviationKind {
    /// Above the mean.
    High,
    /// Below the mean.
    Low,
}

/// A value that deviates from the mean by more than the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariancePoint {
    /// Position in the input.
    pub index: usize,
    /// Raw value.
    pub value: f64,
    /// Distance from the mean in standard deviations.
    pub deviation: f64,
    /// Side of the mean.
    pub kind: DeviationKind,
    /// Signed deviation from the mean as a percentage of `|mean|`; 0 when the mean is 0.
    pub pct_deviation: f64,
}

/// Flags values whose deviation strictly exceeds `threshold` standard deviations.
///
/// A series with zero spread has no deviation points.
#[must_use]
pub fn identify_variance_points(values: &[f64], threshold: f64) -> Vec<VariancePoint> {
    let stats = variance_stats(values);
    if stats.std_dev == 0.0 {
        return Vec::new();
    }
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let deviation = (value - stats.mean).abs() / stats.std_dev;
            if deviation <= threshold {
                return None;
            }
            let pct_deviation = if stats.mean == 0.0 {
                0.0
            } else {
                (value - stats.mean) / stats.mean.abs() * 100.0
            };
            Some(VariancePoint {
                index,
                value: *value,
                deviation,
                kind: if *value > stats.mean {
                    DeviationKind::High
                } else {
                    DeviationKind::Low
                },
                pct_deviation,
            })
        })
        .collect()
}

/// [`identify_variance_points`] at the default 1.5σ threshold.
#[must_use]
pub fn default_variance_points(values: &[f64]) -> Vec<VariancePoint> {
    identify_variance_points(values, DEFAULT_VARIANCE_THRESHOLD)
}

/// Four-tier stability rating derived from the coefficient of variation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StabilityRating {
    /// CV at or below the excellent threshold.
    Excellent,
    /// CV at or below the good threshold.
    Good,
    /// CV at or below the fair threshold.
    Fair,
    /// Anything higher.
    Poor,
}

/// Stability scores for one series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityResult {
    /// `std_dev / |mean|`, 0 when the mean is 0.
    pub coefficient_of_variation: f64,
    /// `max(0, 100 - CV * 100)`.
    pub volatility_score: f64,
    /// `max(0, 100 - reversal rate * 100)`; 0 with fewer than three values.
    pub predictability_index: f64,
    /// `max(0, 100 - mean rolling variance * 10)`; 0 when shorter than the window.
    pub consistency_score: f64,
    /// Tier for the CV.
    pub rating: StabilityRating,
    /// False with fewer than three values.
    pub sufficient_data: bool,
}

/// Stability scores with the default configuration.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::stability::{stability_metrics, StabilityRating};
///
/// let result = stability_metrics(&[15.0, 18.0, 15.0, 25.0]);
/// assert!((result.coefficient_of_variation - 0.224).abs() < 1e-3);
/// assert_eq!(result.rating, StabilityRating::Fair);
/// ```
#[must_use]
pub fn stability_metrics(values: &[f64]) -> StabilityResult {
    stability_metrics_with(values, &StabilityConfig::default())
}

/// Stability scores with caller-supplied window and rating thresholds.
#[must_use]
pub fn stability_metrics_with(values: &[f64], config: &StabilityConfig) -> StabilityResult {
    let cv = stats::coefficient_of_variation(values);
    let n = values.len();

    let predictability_index = if n >= 3 {
        let reversals = count_reversals(values);
        (100.0 - reversals as f64 / (n - 2) as f64 * 100.0).max(0.0)
    } else {
        0.0
    };

    let window = config.rolling_window.max(1);
    let consistency_score = if n >= window {
        let variances: Vec<f64> = values.windows(window).map(stats::variance).collect();
        (100.0 - stats::mean(&variances) * 10.0).max(0.0)
    } else {
        0.0
    };

    if n < 3 {
        debug!(len = n, "Short series for stability scoring");
    }

    StabilityResult {
        coefficient_of_variation: cv,
        volatility_score: (100.0 - cv * 100.0).max(0.0),
        predictability_index,
        consistency_score,
        rating: rate(cv, config),
        sufficient_data: n >= 3,
    }
}

/// Maps a coefficient of variation to a rating tier.
#[must_use]
pub fn rate(cv: f64, config: &StabilityConfig) -> StabilityRating {
    let thresholds = &config.thresholds;
    if cv <= thresholds.excellent {
        StabilityRating::Excellent
    } else if cv <= thresholds.good {
        StabilityRating::Good
    } else if cv <= thresholds.fair {
        StabilityRating::Fair
    } else {
        StabilityRating::Poor
    }
}

/// Number of sign changes in the first difference of `values`.
///
/// Flat steps carry no direction: each move is compared with the last
/// non-flat one, so a plateau at a peak still counts once.
#[must_use]
pub fn count_reversals(values: &[f64]) -> usize {
    let mut last = 0.0;
    let mut reversals = 0;
    for diff in values.windows(2).map(|w| w[1] - w[0]) {
        if diff == 0.0 {
            continue;
        }
        if last * diff < 0.0 {
            reversals += 1;
        }
        last = diff;
    }
    reversals
}

/// How strongly a business cycle moves margins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CyclicalImpact {
    /// Average CV above 0.3.
    High,
    /// Average CV above 0.2.
    Medium,
    /// Anything lower.
    Low,
}

/// One of the three margin series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarginKind {
    /// Gross margin.
    Gross,
    /// Operating margin.
    Operating,
    /// Net margin.
    Net,
}

/// Cyclical sensitivity of the gross, operating and net margin series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleImpact {
    /// CV of the gross margin series.
    pub gross_cv: f64,
    /// CV of the operating margin series.
    pub operating_cv: f64,
    /// CV of the net margin series.
    pub net_cv: f64,
    /// Mean of the three CVs.
    pub average_cv: f64,
    /// Classification of the average CV.
    pub impact: CyclicalImpact,
    /// Series with the lowest CV.
    pub most_stable: MarginKind,
    /// Series with the highest CV.
    pub least_stable: MarginKind,
}

/// Classifies the cyclical impact on three parallel margin series.
///
/// Ties resolve in gross, operating, net order.
#[must_use]
pub fn business_cycle_impact(gross: &[f64], operating: &[f64], net: &[f64]) -> CycleImpact {
    let cvs = [
        (MarginKind::Gross, stats::coefficient_of_variation(gross)),
        (MarginKind::Operating, stats::coefficient_of_variation(operating)),
        (MarginKind::Net, stats::coefficient_of_variation(net)),
    ];
    let average_cv = cvs.iter().map(|(_, cv)| cv).sum::<f64>() / cvs.len() as f64;
    let impact = if average_cv > 0.3 {
        CyclicalImpact::High
    } else if average_cv > 0.2 {
        CyclicalImpact::Medium
    } else {
        CyclicalImpact::Low
    };

    let mut most_stable = cvs[0];
    let mut least_stable = cvs[0];
    for candidate in &cvs[1..] {
        if candidate.1 < most_stable.1 {
            most_stable = *candidate;
        }
        if candidate.1 > least_stable.1 {
            least_stable = *candidate;
        }
    }

    CycleImpact {
        gross_cv: cvs[0].1,
        operating_cv: cvs[1].1,
        net_cv: cvs[2].1,
        average_cv,
        impact,
        most_stable: most_stable.0,
        least_stable: least_stable.0,
    }
}
