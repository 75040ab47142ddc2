//! Trend regression, reversal detection and projection.
//!
//! Inputs are oldest first. A trend is an OLS fit over the trailing window with
//! x = 0..n-1; direction, strength and significance are thresholded on the
//! slope and R².

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats::{self, Regression};

/// Fewest points a trend window may hold.
pub const MIN_TREND_POINTS: usize = 3;

/// Direction of a fitted trend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    /// Rising: slope above 0.1 with R² above 0.3.
    Up,
    /// Falling: slope below -0.1 with R² above 0.3.
    Down,
    /// No reliable direction.
    #[default]
    Neutral,
}

/// Strength of a fitted trend, ordered weakest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendStrength {
    /// Neither moderate nor strong.
    #[default]
    Weak,
    /// |slope| above 0.2 with R² above 0.5.
    Moderate,
    /// |slope| above 0.5 with R² above 0.7.
    Strong,
}

/// Statistical significance of a fitted trend, ordered lowest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Significance {
    /// Neither medium nor high.
    #[default]
    Low,
    /// R² above 0.5 with |slope| above 0.15.
    Medium,
    /// R² above 0.7 with |slope| above 0.3.
    High,
}

/// Trend of the trailing window of a series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    /// Direction of the fit.
    pub direction: TrendDirection,
    /// Strength of the fit.
    pub strength: TrendStrength,
    /// Slope per period.
    pub slope: f64,
    /// Fitted value at the start of the window.
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Endpoint-to-endpoint average change per period, signed.
    pub velocity: f64,
    /// `max(0, 1 - mean |residual| / |mean|)`.
    pub consistency: f64,
    /// Consecutive trailing periods whose change matches the slope's sign.
    pub duration: usize,
    /// Significance of the fit.
    pub significance: Significance,
    /// Latest value of the series.
    pub current_value: f64,
    /// One-period-ahead projection.
    pub projection: f64,
    /// Points actually used for the fit.
    pub window: usize,
    /// False when fewer than three points were available.
    pub sufficient_data: bool,
}

/// Fits a trend over the trailing `window` points of `values`.
///
/// Fewer than three points (overall or in the window) give a neutral,
/// zeroed result whose projection equals the latest value.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::trend::{trend_analysis, TrendDirection, TrendStrength};
///
/// let trend = trend_analysis(&[10.0, 11.0, 12.0, 13.0, 14.0], 5);
/// assert_eq!(trend.direction, TrendDirection::Up);
/// assert_eq!(trend.strength, TrendStrength::Strong);
/// assert!((trend.projection - 15.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn trend_analysis(values: &[f64], window: usize) -> TrendResult {
    let current_value = values.last().copied().unwrap_or(0.0);
    let n = values.len();
    let effective = window.min(n);
    if n < MIN_TREND_POINTS || effective < MIN_TREND_POINTS {
        debug!(len = n, window, "Insufficient points for trend analysis");
        return TrendResult {
            current_value,
            projection: current_value,
            window: effective,
            ..TrendResult::default()
        };
    }

    let tail = &values[n - effective..];
    let fit = stats::linear_regression(tail);
    let direction = direction_of(&fit);
    let velocity = (tail[effective - 1] - tail[0]) / (effective - 1) as f64;

    TrendResult {
        direction,
        strength: strength_of(&fit),
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        velocity,
        consistency: fit_consistency(tail, &fit),
        duration: trailing_duration(values, fit.slope),
        significance: significance_of(&fit),
        current_value,
        projection: project_next(current_value, velocity, direction),
        window: effective,
        sufficient_data: true,
    }
}

/// Projects the next value one period ahead.
///
/// Moves by the magnitude of `velocity` in the trend's direction; a neutral
/// trend projects the current value unchanged.
#[must_use]
pub fn project_next(current_value: f64, velocity: f64, direction: TrendDirection) -> f64 {
    match direction {
        TrendDirection::Up => current_value + velocity.abs(),
        TrendDirection::Down => current_value - velocity.abs(),
        TrendDirection::Neutral => current_value,
    }
}

fn direction_of(fit: &Regression) -> TrendDirection {
    if fit.slope.abs() > 0.1 && fit.r_squared > 0.3 {
        if fit.slope > 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    } else {
        TrendDirection::Neutral
    }
}

fn strength_of(fit: &Regression) -> TrendStrength {
    let slope = fit.slope.abs();
    if slope > 0.5 && fit.r_squared > 0.7 {
        TrendStrength::Strong
    } else if slope > 0.2 && fit.r_squared > 0.5 {
        TrendStrength::Moderate
    } else {
        TrendStrength::Weak
    }
}

fn significance_of(fit: &Regression) -> Significance {
    let slope = fit.slope.abs();
    if fit.r_squared > 0.7 && slope > 0.3 {
        Significance::High
    } else if fit.r_squared > 0.5 && slope > 0.15 {
        Significance::Medium
    } else {
        Significance::Low
    }
}

fn fit_consistency(values: &[f64], fit: &Regression) -> f64 {
    let mean = stats::mean(values);
    if mean == 0.0 {
        return 0.0;
    }
    let residuals: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (v - fit.predict(i as f64)).abs())
        .collect();
    (1.0 - stats::mean(&residuals) / mean.abs()).max(0.0)
}

/// Counts consecutive period-over-period changes, from the end of the full
/// series backwards, whose sign matches `slope`.
fn trailing_duration(values: &[f64], slope: f64) -> usize {
    if slope == 0.0 {
        return 0;
    }
    values
        .windows(2)
        .rev()
        .take_while(|w| {
            let change = w[1] - w[0];
            change != 0.0 && change.signum() == slope.signum()
        })
        .count()
}

/// Whether a reversal is backed by a strong trend after the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReversalKind {
    /// The trend after the turn is strong.
    Confirmed,
    /// The trend after the turn is weak or moderate.
    Potential,
}

/// A change of trend direction between adjacent windows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reversal {
    /// First index of the window after the turn.
    pub index: usize,
    /// Direction before the turn.
    pub from: TrendDirection,
    /// Direction after the turn.
    pub to: TrendDirection,
    /// Stronger of the two windows' strengths.
    pub severity: TrendStrength,
    /// Confirmed or potential.
    pub kind: ReversalKind,
    /// Slope of the window before the turn.
    pub slope_before: f64,
    /// Slope of the window after the turn.
    pub slope_after: f64,
}

/// Detects trend reversals by comparing adjacent `window`-point regressions.
///
/// Each interior index `i` with `i >= window` and `i + window < len` compares
/// `values[i - window..i]` with `values[i..i + window]`. A reversal needs both
/// windows directional and pointing different ways. Runs of adjacent indices
/// reporting the same transition collapse into the first index of the run.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::trend::{detect_reversals, TrendDirection};
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
/// let reversals = detect_reversals(&values, 3);
/// assert_eq!(reversals.len(), 1);
/// assert_eq!(reversals[0].from, TrendDirection::Up);
/// assert_eq!(reversals[0].to, TrendDirection::Down);
/// ```
#[must_use]
pub fn detect_reversals(values: &[f64], window: usize) -> Vec<Reversal> {
    let mut reversals: Vec<Reversal> = Vec::new();
    if window == 0 {
        return reversals;
    }
    let mut last_hit: Option<(usize, TrendDirection, TrendDirection)> = None;

    for i in window..values.len() {
        if i + window >= values.len() {
            break;
        }
        let before = trend_analysis(&values[i - window..i], window);
        let after = trend_analysis(&values[i..i + window], window);
        if before.direction == TrendDirection::Neutral
            || after.direction == TrendDirection::Neutral
            || before.direction == after.direction
        {
            continue;
        }

        let continues_run = matches!(
            last_hit,
            Some((index, from, to))
                if index + 1 == i && from == before.direction && to == after.direction
        );
        last_hit = Some((i, before.direction, after.direction));
        if continues_run {
            continue;
        }

        reversals.push(Reversal {
            index: i,
            from: before.direction,
            to: after.direction,
            severity: before.strength.max(after.strength),
            kind: if after.strength == TrendStrength::Strong {
                ReversalKind::Confirmed
            } else {
                ReversalKind::Potential
            },
            slope_before: before.slope,
            slope_after: after.slope,
        });
    }

    debug!(
        len = values.len(),
        window,
        found = reversals.len(),
        "Scanned for trend reversals"
    );
    reversals
}

/// Regression slope of every trailing `window`-point window, oldest first.
///
/// The output has `len - window + 1` entries; windows under two points give
/// an empty series.
#[must_use]
pub fn rolling_slopes(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| stats::linear_regression(w).slope)
        .collect()
}
