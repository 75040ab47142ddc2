//! Shared descriptive statistics.
//!
//! Population statistics throughout (divide by N). Every function is total:
//! empty or degenerate input yields zeros, never NaN.

use serde::{Deserialize, Serialize};

/// Arithmetic mean; 0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; 0 for an empty slice.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Coefficient of variation, `std_dev / |mean|`; 0 when the mean is 0.
#[must_use]
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    std_dev(values) / m.abs()
}

/// Ordinary least squares fit of `values` against `x = 0..n-1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    /// Change in value per period.
    pub slope: f64,
    /// Fitted value at x = 0.
    pub intercept: f64,
    /// Coefficient of determination; 0 when the series has no variance.
    pub r_squared: f64,
}

impl Regression {
    /// Fitted value at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fits a simple linear regression; fewer than two points give a flat fit.
#[must_use]
pub fn linear_regression(values: &[f64]) -> Regression {
    let n = values.len();
    if n < 2 {
        return Regression {
            intercept: values.first().copied().unwrap_or(0.0),
            ..Regression::default()
        };
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    let slope = if den == 0.0 { 0.0 } else { num / den };
    let intercept = y_mean - slope * x_mean;

    let fit = Regression {
        slope,
        intercept,
        r_squared: 0.0,
    };
    let ss_tot: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - fit.predict(i as f64)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Regression { r_squared, ..fit }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_population_statistics() {
        let values = [15.0, 18.0, 15.0, 25.0];
        assert!(approx(mean(&values), 18.25, 1e-12));
        assert!(approx(variance(&values), 16.6875, 1e-12));
        assert!(approx(std_dev(&values), 4.0850, 1e-4));
        assert!(approx(coefficient_of_variation(&values), 0.22384, 1e-4));
    }

    #[test]
    fn test_empty_statistics_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_regression_on_perfect_line() {
        let fit = linear_regression(&[2.0, 4.0, 6.0, 8.0]);
        assert!(approx(fit.slope, 2.0, 1e-12));
        assert!(approx(fit.intercept, 2.0, 1e-12));
        assert!(approx(fit.r_squared, 1.0, 1e-12));
        assert!(approx(fit.predict(4.0), 10.0, 1e-12));
    }

    #[test]
    fn test_regression_on_flat_series() {
        let fit = linear_regression(&[5.0, 5.0, 5.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(fit.intercept, 5.0);
    }
}
