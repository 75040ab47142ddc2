//! Reporting period definitions.
//!
//! [`PeriodType`] tells the engine how far apart consecutive records are, which
//! matters when converting year horizons into record offsets.

use serde::{Deserialize, Serialize};

/// Period type for fundamental financial data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodType {
    /// Annual reporting period.
    #[default]
    Annual,
    /// Quarterly reporting period.
    Quarterly,
}

impl PeriodType {
    /// Number of records that make up one year.
    #[must_use]
    pub const fn periods_per_year(&self) -> usize {
        match self {
            Self::Annual => 1,
            Self::Quarterly => 4,
        }
    }

    /// Length of one record in months.
    #[must_use]
    pub const fn months_per_period(&self) -> f64 {
        match self {
            Self::Annual => 12.0,
            Self::Quarterly => 3.0,
        }
    }

    /// Record offset that spans `years` years.
    #[must_use]
    pub const fn offset_for_years(&self, years: usize) -> usize {
        years * self.periods_per_year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(PeriodType::Annual.offset_for_years(5), 5);
        assert_eq!(PeriodType::Quarterly.offset_for_years(3), 12);
        assert_eq!(PeriodType::Quarterly.months_per_period(), 3.0);
    }

    #[test]
    fn test_default_is_annual() {
        assert_eq!(PeriodType::default(), PeriodType::Annual);
    }
}
