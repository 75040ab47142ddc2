//! Period series validation.
//!
//! The validator never fails: it always returns a best-effort
//! [`ValidationReport`] describing ordering problems, gaps and bad values.
//! Callers that need strict input gate on [`ValidationReport::is_valid`].

use std::collections::BTreeSet;

use finmetrics_core::{Metric, PeriodRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of validating a period series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// False when the series is empty, misordered, has duplicate indices or
    /// non-finite values. Gaps alone do not invalidate a series.
    pub is_valid: bool,
    /// Distinct periods present as a percentage of the span between the
    /// lowest and highest `period_index`.
    pub completeness_pct: f64,
    /// Number of records inspected.
    pub record_count: usize,
    /// Number of periods missing inside the span.
    pub missing_periods: usize,
    /// Human-readable findings, in series order.
    pub warnings: Vec<String>,
}

/// Checks a series for most-recent-first ordering, gaps and value quality.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::validate::SeriesValidator;
/// use finmetrics_core::{Metric, PeriodRecord};
///
/// let records = vec![
///     PeriodRecord::new("FY24", 24).with_metric(Metric::Revenue, 120.0),
///     PeriodRecord::new("FY22", 22).with_metric(Metric::Revenue, 100.0),
/// ];
/// let report = SeriesValidator::new().validate(&records);
/// assert!(report.is_valid);
/// assert_eq!(report.missing_periods, 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SeriesValidator {
    required: Vec<Metric>,
}

impl SeriesValidator {
    /// Creates a validator with no required metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Warns about records that lack `metric`.
    #[must_use]
    pub fn require(mut self, metric: impl Into<Metric>) -> Self {
        self.required.push(metric.into());
        self
    }

    /// Validates `records`, expected most recent first.
    #[must_use]
    pub fn validate(&self, records: &[PeriodRecord]) -> ValidationReport {
        if records.is_empty() {
            return ValidationReport {
                warnings: vec!["series is empty".to_string()],
                ..ValidationReport::default()
            };
        }

        let mut warnings = Vec::new();
        let mut ordered = true;
        let mut finite = true;

        for (i, pair) in records.windows(2).enumerate() {
            let (newer, older) = (&pair[0], &pair[1]);
            let position = i + 1;
            let step = index_step(newer, older);
            if step == 0 {
                ordered = false;
                warnings.push(format!(
                    "duplicate period index {} at index {position}",
                    older.period_index()
                ));
            } else if step < 0 {
                ordered = false;
                warnings.push(format!("non-monotonic ordering detected at index {position}"));
            } else if step > 1 {
                warnings.push(gap_warning(newer, older, step));
            }

            if let (Some(newer_end), Some(older_end)) = (newer.period_end(), older.period_end()) {
                if newer_end <= older_end {
                    warnings.push(format!(
                        "period end dates out of order at index {position} ({newer_end} <= {older_end})"
                    ));
                }
            }
        }

        for (i, record) in records.iter().enumerate() {
            for (metric, value) in record.metrics() {
                if !value.is_finite() {
                    finite = false;
                    warnings.push(format!(
                        "non-finite {metric} in {} at index {i}",
                        record.period_label()
                    ));
                }
            }
            for metric in &self.required {
                if record.get(metric).is_none() {
                    warnings.push(format!(
                        "missing {metric} in {} at index {i}",
                        record.period_label()
                    ));
                }
            }
        }

        let distinct: BTreeSet<i64> = records.iter().map(PeriodRecord::period_index).collect();
        let (lowest, highest) = match (distinct.first(), distinct.last()) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => (0, 0),
        };
        let span = i128::from(highest) - i128::from(lowest) + 1;
        let missing_periods = usize::try_from(span - distinct.len() as i128).unwrap_or(usize::MAX);
        let completeness_pct = distinct.len() as f64 / span as f64 * 100.0;

        let report = ValidationReport {
            is_valid: ordered && finite,
            completeness_pct,
            record_count: records.len(),
            missing_periods,
            warnings,
        };
        debug!(
            records = report.record_count,
            valid = report.is_valid,
            completeness = report.completeness_pct,
            warnings = report.warnings.len(),
            "Validated period series"
        );
        report
    }
}

/// Distance between two records' period indices, widened so extreme indices
/// cannot overflow.
#[must_use]
pub fn index_step(newer: &PeriodRecord, older: &PeriodRecord) -> i128 {
    i128::from(newer.period_index()) - i128::from(older.period_index())
}

/// Warnings for every adjacent pair in `window` whose indices are not exactly
/// one period apart. Ordering problems are reported the same way, since any
/// such window no longer covers consecutive periods.
#[must_use]
pub fn window_gaps(window: &[PeriodRecord]) -> Vec<String> {
    window
        .windows(2)
        .filter_map(|pair| {
            let (newer, older) = (&pair[0], &pair[1]);
            match index_step(newer, older) {
                1 => None,
                step if step > 1 => Some(gap_warning(newer, older, step)),
                _ => Some(format!(
                    "{} does not precede {}",
                    older.period_label(),
                    newer.period_label()
                )),
            }
        })
        .collect()
}

fn gap_warning(newer: &PeriodRecord, older: &PeriodRecord, step: i128) -> String {
    format!(
        "gap between {} and {} ({} missing)",
        newer.period_label(),
        older.period_label(),
        step - 1
    )
}

/// Validates a series with no required metrics.
#[must_use]
pub fn validate_series(records: &[PeriodRecord]) -> ValidationReport {
    SeriesValidator::new().validate(records)
}
