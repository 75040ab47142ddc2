//! Phase segmentation and business-cycle labeling.

use serde::{Deserialize, Serialize};

/// A maximal run of periods sharing one label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseBand<L> {
    /// First index of the run.
    pub start: usize,
    /// Last index of the run, inclusive.
    pub end: usize,
    /// Label shared by the run.
    pub label: L,
    /// Number of periods in the run.
    pub duration: usize,
    /// Mean intensity over the run, when intensities were supplied.
    pub average_intensity: Option<f64>,
}

/// Splits `labels` into maximal contiguous runs of equal labels.
///
/// When `intensities` is given, each band averages the intensities that fall
/// inside its span; a band beyond the end of a shorter intensity slice gets
/// `None`.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::phase::segment_phases;
///
/// let bands = segment_phases(&["up", "up", "down"], Some(&[1.0, 3.0, 5.0]));
/// assert_eq!(bands.len(), 2);
/// assert_eq!(bands[0].average_intensity, Some(2.0));
/// assert_eq!(bands[1].start, 2);
/// ```
#[must_use]
pub fn segment_phases<L: PartialEq + Clone>(
    labels: &[L],
    intensities: Option<&[f64]>,
) -> Vec<PhaseBand<L>> {
    let mut bands: Vec<PhaseBand<L>> = Vec::new();
    let mut start = 0;
    for i in 1..=labels.len() {
        if i < labels.len() && labels[i] == labels[start] {
            continue;
        }
        if i > start {
            bands.push(PhaseBand {
                start,
                end: i - 1,
                label: labels[start].clone(),
                duration: i - start,
                average_intensity: intensities.and_then(|values| span_average(values, start, i)),
            });
        }
        start = i;
    }
    bands
}

fn span_average(values: &[f64], start: usize, end: usize) -> Option<f64> {
    let span = values.get(start..end.min(values.len()))?;
    if span.is_empty() {
        return None;
    }
    Some(span.iter().sum::<f64>() / span.len() as f64)
}

/// Qualitative business-cycle label of one period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CyclePhase {
    /// Positive and non-decreasing growth.
    Expansion,
    /// Positive but decreasing growth.
    Peak,
    /// Non-positive and decreasing growth.
    Contraction,
    /// Non-positive but non-decreasing growth.
    Trough,
}

/// Labels each period of an oldest-first growth series.
///
/// The first period has no predecessor and counts as non-decreasing.
#[must_use]
pub fn classify_cycle_phases(growth: &[f64]) -> Vec<CyclePhase> {
    growth
        .iter()
        .enumerate()
        .map(|(i, &g)| {
            let rising = i == 0 || g >= growth[i - 1];
            match (g > 0.0, rising) {
                (true, true) => CyclePhase::Expansion,
                (true, false) => CyclePhase::Peak,
                (false, false) => CyclePhase::Contraction,
                (false, true) => CyclePhase::Trough,
            }
        })
        .collect()
}
