//! Pearson correlation and margin alignment.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{stats, trend};

/// Pearson correlation coefficient of two equal-length series.
///
/// Unequal lengths, fewer than two points, or a series without variance
/// give 0.
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        debug!(x_len = x.len(), y_len = y.len(), "Correlation undefined; returning 0");
        return 0.0;
    }
    let x_mean = stats::mean(x);
    let y_mean = stats::mean(y);

    let mut cov = 0.0;
    let mut x_ss = 0.0;
    let mut y_ss = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - x_mean;
        let dy = b - y_mean;
        cov += dx * dy;
        x_ss += dx * dx;
        y_ss += dy * dy;
    }
    if x_ss == 0.0 || y_ss == 0.0 {
        return 0.0;
    }
    (cov / (x_ss * y_ss).sqrt()).clamp(-1.0, 1.0)
}

/// How closely three margin series move together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    /// Average |r| above 0.7.
    High,
    /// Average |r| above 0.4.
    Medium,
    /// Everything else.
    Low,
}

impl Alignment {
    /// Classifies an average absolute correlation.
    #[must_use]
    pub fn from_average(average_abs: f64) -> Self {
        if average_abs > 0.7 {
            Self::High
        } else if average_abs > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Pairwise correlations of gross, operating and net margin series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginAlignment {
    /// Gross vs operating.
    pub gross_operating: f64,
    /// Gross vs net.
    pub gross_net: f64,
    /// Operating vs net.
    pub operating_net: f64,
    /// Mean of the three absolute coefficients.
    pub average_abs: f64,
    /// Classification of `average_abs`.
    pub alignment: Alignment,
}

/// Correlates three parallel margin series pairwise.
#[must_use]
pub fn margin_alignment(gross: &[f64], operating: &[f64], net: &[f64]) -> MarginAlignment {
    let gross_operating = pearson_correlation(gross, operating);
    let gross_net = pearson_correlation(gross, net);
    let operating_net = pearson_correlation(operating, net);
    let average_abs = (gross_operating.abs() + gross_net.abs() + operating_net.abs()) / 3.0;

    MarginAlignment {
        gross_operating,
        gross_net,
        operating_net,
        average_abs,
        alignment: Alignment::from_average(average_abs),
    }
}

/// Correlates the rolling trend slopes of three margin series.
///
/// Each series is reduced to its per-window regression slope first, so the
/// result describes whether the margins trend together rather than whether
/// their levels co-move.
#[must_use]
pub fn margin_trend_alignment(
    gross: &[f64],
    operating: &[f64],
    net: &[f64],
    window: usize,
) -> MarginAlignment {
    margin_alignment(
        &trend::rolling_slopes(gross, window),
        &trend::rolling_slopes(operating, window),
        &trend::rolling_slopes(net, window),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::approx;

    #[test]
    fn test_perfect_correlations() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(pearson_correlation(&x, &[2.0, 4.0, 6.0, 8.0]), 1.0, 1e-12));
        assert!(approx(pearson_correlation(&x, &[8.0, 6.0, 4.0, 2.0]), -1.0, 1e-12));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(pearson_correlation(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(pearson_correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0.0);
        assert_eq!(pearson_correlation(&[1.0], &[1.0]), 0.0);
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
    }

    #[test]
    fn test_known_coefficient() {
        // r = 0.8 for this textbook pair
        let r = pearson_correlation(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]);
        assert!(approx(r, 0.8, 1e-12));
    }

    #[test]
    fn test_margin_alignment_levels() {
        let gross = [40.0, 41.0, 42.0, 43.0];
        let operating = [20.0, 21.0, 22.0, 23.0];
        let net = [10.0, 10.5, 11.0, 11.5];
        let result = margin_alignment(&gross, &operating, &net);
        assert_eq!(result.alignment, Alignment::High);
        assert!(approx(result.average_abs, 1.0, 1e-12));

        let flat = margin_alignment(&gross, &[5.0; 4], &[5.0; 4]);
        assert_eq!(flat.alignment, Alignment::Low);
        assert_eq!(flat.average_abs, 0.0);
    }

    #[test]
    fn test_alignment_thresholds() {
        assert_eq!(Alignment::from_average(0.71), Alignment::High);
        assert_eq!(Alignment::from_average(0.7), Alignment::Medium);
        assert_eq!(Alignment::from_average(0.41), Alignment::Medium);
        assert_eq!(Alignment::from_average(0.4), Alignment::Low);
    }

    #[test]
    fn test_margin_trend_alignment() {
        let gross = [30.0, 31.0, 33.0, 36.0, 40.0, 45.0];
        let operating = [10.0, 10.5, 11.5, 13.0, 15.0, 17.5];
        let net = [5.0, 5.2, 5.6, 6.2, 7.0, 8.0];
        let result = margin_trend_alignment(&gross, &operating, &net, 3);
        assert_eq!(result.alignment, Alignment::High);
        assert!(result.gross_operating > 0.99);

        let short = margin_trend_alignment(&gross[..2], &operating[..2], &net[..2], 3);
        assert_eq!(short.alignment, Alignment::Low);
    }
}
