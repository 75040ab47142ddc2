//! Cash burn and runway of the latest period.

use finmetrics_core::{Metric, PeriodSeries};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How long current cash lasts at the current burn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "months")]
pub enum Runway {
    /// Free cash flow is non-negative; cash is not being consumed.
    SelfSustaining,
    /// Months of cash left at the current monthly burn.
    Months(f64),
}

impl Runway {
    /// Months remaining, or `None` when self-sustaining.
    #[must_use]
    pub const fn months(&self) -> Option<f64> {
        match self {
            Self::SelfSustaining => None,
            Self::Months(months) => Some(*months),
        }
    }
}

/// Free cash flow, burn rate and runway of the latest period.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnAnalysis {
    /// Operating cash flow minus capex for the latest period.
    pub free_cash_flow: f64,
    /// Cash consumed per month; 0 when free cash flow is non-negative.
    pub monthly_burn: f64,
    /// Cash on hand at the end of the latest period.
    pub cash: f64,
    /// Runway at the current burn.
    pub runway: Runway,
    /// False when the series is empty.
    pub sufficient_data: bool,
}

/// Derives burn and runway from the latest record of `series`.
///
/// Free cash flow is `operatingCashFlow - capex`; a negative value is spread
/// over the months of one period to give the monthly burn. Runway is
/// `cash / monthly_burn`, or 0 when cash is non-positive.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::burn::{burn_analysis, Runway};
/// use finmetrics_core::{Metric, PeriodRecord, PeriodSeries, PeriodType};
///
/// let latest = PeriodRecord::new("Q4", 4)
///     .with_metric(Metric::OperatingCashFlow, -20.0)
///     .with_metric(Metric::Capex, 10.0)
///     .with_metric(Metric::Cash, 120.0);
/// let series = PeriodSeries::new(vec![latest], PeriodType::Quarterly);
/// let burn = burn_analysis(&series);
/// assert_eq!(burn.monthly_burn, 10.0);
/// assert_eq!(burn.runway, Runway::Months(12.0));
/// ```
#[must_use]
pub fn burn_analysis(series: &PeriodSeries) -> BurnAnalysis {
    let Some(latest) = series.latest() else {
        debug!("Empty series; no burn analysis");
        return BurnAnalysis {
            free_cash_flow: 0.0,
            monthly_burn: 0.0,
            cash: 0.0,
            runway: Runway::SelfSustaining,
            sufficient_data: false,
        };
    };

    let free_cash_flow = latest.value(&Metric::OperatingCashFlow) - latest.value(&Metric::Capex);
    let cash = latest.value(&Metric::Cash);
    if free_cash_flow >= 0.0 {
        return BurnAnalysis {
            free_cash_flow,
            monthly_burn: 0.0,
            cash,
            runway: Runway::SelfSustaining,
            sufficient_data: true,
        };
    }

    let monthly_burn = -free_cash_flow / series.period_type().months_per_period();
    let months = if cash <= 0.0 { 0.0 } else { cash / monthly_burn };
    debug!(
        period = latest.period_label(),
        monthly_burn, months, "Cash is being consumed"
    );

    BurnAnalysis {
        free_cash_flow,
        monthly_burn,
        cash,
        runway: Runway::Months(months),
        sufficient_data: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::approx;
    use finmetrics_core::{PeriodRecord, PeriodType};

    fn series(ocf: f64, capex: f64, cash: f64, period_type: PeriodType) -> PeriodSeries {
        let latest = PeriodRecord::new("latest", 1)
            .with_metric(Metric::OperatingCashFlow, ocf)
            .with_metric(Metric::Capex, capex)
            .with_metric(Metric::Cash, cash);
        let prior = PeriodRecord::new("prior", 0)
            .with_metric(Metric::OperatingCashFlow, -500.0)
            .with_metric(Metric::Cash, 1.0);
        PeriodSeries::new(vec![latest, prior], period_type)
    }

    #[test]
    fn test_self_sustaining() {
        let burn = burn_analysis(&series(50.0, 20.0, 100.0, PeriodType::Quarterly));
        assert_eq!(burn.free_cash_flow, 30.0);
        assert_eq!(burn.monthly_burn, 0.0);
        assert_eq!(burn.runway, Runway::SelfSustaining);
        assert_eq!(burn.runway.months(), None);

        let breakeven = burn_analysis(&series(20.0, 20.0, 100.0, PeriodType::Quarterly));
        assert_eq!(breakeven.runway, Runway::SelfSustaining);
    }

    #[test]
    fn test_annual_burn() {
        let burn = burn_analysis(&series(-100.0, 20.0, 240.0, PeriodType::Annual));
        assert!(approx(burn.monthly_burn, 10.0, 1e-12));
        assert_eq!(burn.runway.months(), Some(24.0));
        assert!(burn.sufficient_data);
    }

    #[test]
    fn test_no_cash_left() {
        let burn = burn_analysis(&series(-30.0, 0.0, 0.0, PeriodType::Quarterly));
        assert_eq!(burn.runway, Runway::Months(0.0));
        let overdrawn = burn_analysis(&series(-30.0, 0.0, -5.0, PeriodType::Quarterly));
        assert_eq!(overdrawn.runway, Runway::Months(0.0));
    }

    #[test]
    fn test_empty_series() {
        let burn = burn_analysis(&PeriodSeries::new(Vec::new(), PeriodType::Quarterly));
        assert!(!burn.sufficient_data);
        assert_eq!(burn.runway, Runway::SelfSustaining);
    }

    #[test]
    fn test_runway_serializes_tagged() {
        let json = serde_json::to_value(Runway::Months(6.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "months", "months": 6.0 }));
        let json = serde_json::to_value(Runway::SelfSustaining).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "selfSustaining" }));
    }
}
