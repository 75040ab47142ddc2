//! Simple moving averages and crossover detection.
//!
//! Inputs are oldest first. Outputs keep index alignment with the input: a
//! position without a full trailing window holds `None`.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which way the short average crossed the long one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrossoverKind {
    /// Short average moved from at-or-below to above the long average.
    Bullish,
    /// Short average moved from at-or-above to below the long average.
    Bearish,
}

/// A crossover between two moving averages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crossover {
    /// Index at which the cross is first observed.
    pub index: usize,
    /// Direction of the cross.
    pub kind: CrossoverKind,
    /// Short average at `index`.
    pub short_value: f64,
    /// Long average at `index`.
    pub long_value: f64,
}

/// Simple moving average over `period` trailing values.
///
/// The output has the same length as `values`; the first `period - 1` entries
/// are `None`. A zero period yields all `None`.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::moving_average::moving_average;
///
/// let ma = moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
/// assert_eq!(ma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
/// ```
#[must_use]
pub fn moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let mut out = vec![None; (period - 1).min(values.len())];
    out.extend(
        values
            .windows(period)
            .map(|window| Some(window.iter().sum::<f64>() / period as f64)),
    );
    trace!(period, len = out.len(), "Computed moving average");
    out
}

/// Detects crossovers between a short and a long moving average.
///
/// Only adjacent pairs where all four values are defined are inspected, so no
/// crossover is ever reported at an insufficient-window position.
#[must_use]
pub fn detect_crossovers(short: &[Option<f64>], long: &[Option<f64>]) -> Vec<Crossover> {
    let len = short.len().min(long.len());
    (1..len)
        .filter_map(|i| {
            let (prev_short, prev_long, cur_short, cur_long) =
                (short[i - 1]?, long[i - 1]?, short[i]?, long[i]?);
            let kind = if prev_short <= prev_long && cur_short > cur_long {
                CrossoverKind::Bullish
            } else if prev_short >= prev_long && cur_short < cur_long {
                CrossoverKind::Bearish
            } else {
                return None;
            };
            Some(Crossover {
                index: i,
                kind,
                short_value: cur_short,
                long_value: cur_long,
            })
        })
        .collect()
}

/// Short and long averages plus the crossovers between them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingAverageCrossover {
    /// Short average, aligned with the input.
    pub short: Vec<Option<f64>>,
    /// Long average, aligned with the input.
    pub long: Vec<Option<f64>>,
    /// Crossovers in index order.
    pub crossovers: Vec<Crossover>,
}

/// Computes both averages of `values` and their crossovers.
#[must_use]
pub fn moving_average_crossover(
    values: &[f64],
    short_period: usize,
    long_period: usize,
) -> MovingAverageCrossover {
    let short = moving_average(values, short_period);
    let long = moving_average(values, long_period);
    let crossovers = detect_crossovers(&short, &long);
    MovingAverageCrossover {
        short,
        long,
        crossovers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::approx;

    #[test]
    fn test_alignment_and_first_window() {
        let values = [4.0, 8.0, 6.0, 10.0, 2.0];
        let ma = moving_average(&values, 3);
        assert_eq!(ma.len(), values.len());
        assert_eq!(ma[0], None);
        assert_eq!(ma[1], None);
        assert_eq!(ma[2], Some(6.0));
        assert!(approx(ma[3].unwrap(), 8.0, 1e-12));
        assert!(approx(ma[4].unwrap(), 6.0, 1e-12));
    }

    #[test]
    fn test_period_longer_than_input() {
        let ma = moving_average(&[1.0, 2.0], 5);
        assert_eq!(ma, vec![None, None]);
        assert_eq!(moving_average(&[1.0, 2.0], 0), vec![None, None]);
        assert!(moving_average(&[], 3).is_empty());
    }

    #[test]
    fn test_bullish_and_bearish() {
        let short = [Some(1.0), Some(2.0), Some(3.0), Some(1.0)];
        let long = [Some(2.0), Some(2.0), Some(2.0), Some(2.0)];
        let crossovers = detect_crossovers(&short, &long);
        assert_eq!(crossovers.len(), 2);
        assert_eq!(crossovers[0].index, 2);
        assert_eq!(crossovers[0].kind, CrossoverKind::Bullish);
        assert_eq!(crossovers[1].index, 3);
        assert_eq!(crossovers[1].kind, CrossoverKind::Bearish);
    }

    #[test]
    fn test_no_crossover_at_undefined_positions() {
        let values = [10.0, 1.0, 1.0, 1.0, 10.0, 10.0, 10.0, 1.0, 1.0];
        let result = moving_average_crossover(&values, 2, 4);
        for crossover in &result.crossovers {
            assert!(result.short[crossover.index].is_some());
            assert!(result.long[crossover.index].is_some());
            assert!(result.short[crossover.index - 1].is_some());
            assert!(result.long[crossover.index - 1].is_some());
        }
        assert!(!result.crossovers.is_empty());
    }

    #[test]
    fn test_touch_then_fall_back_is_bearish() {
        let short = [Some(1.0), Some(2.0), Some(1.0)];
        let long = [Some(2.0), Some(2.0), Some(2.0)];
        let crossovers = detect_crossovers(&short, &long);
        assert_eq!(crossovers.len(), 1);
        assert_eq!(crossovers[0].kind, CrossoverKind::Bearish);
    }

    #[test]
    fn test_no_cross_while_below() {
        let short = [Some(1.0), Some(1.5), Some(1.0)];
        let long = [Some(2.0), Some(2.0), Some(2.0)];
        assert!(detect_crossovers(&short, &long).is_empty());
    }
}
