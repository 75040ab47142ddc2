//! Classification of TTM margins and ratios against caller-supplied ranges.

use finmetrics_core::{BenchmarkMetric, BenchmarkRange, BenchmarkTable};
use serde::{Deserialize, Serialize};

use crate::ttm::TtmResult;

/// Where a value sits relative to its benchmark range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BenchmarkPosition {
    /// Below the low bound.
    Below,
    /// Within the range, bounds included.
    Within,
    /// Above the high bound.
    Above,
}

impl BenchmarkPosition {
    /// Positions `value` against `range`.
    #[must_use]
    pub fn of(value: f64, range: &BenchmarkRange) -> Self {
        if range.contains(value) {
            Self::Within
        } else if value < range.low {
            Self::Below
        } else {
            Self::Above
        }
    }
}

/// One benchmarked TTM value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReading {
    /// Which margin or ratio.
    pub metric: BenchmarkMetric,
    /// TTM value.
    pub value: f64,
    /// Configured range.
    pub range: BenchmarkRange,
    /// Position of the value within the range.
    pub position: BenchmarkPosition,
}

/// Reads the TTM value that corresponds to `metric`.
#[must_use]
pub const fn ttm_value(ttm: &TtmResult, metric: BenchmarkMetric) -> f64 {
    match metric {
        BenchmarkMetric::GrossMargin => ttm.margins.gross_margin,
        BenchmarkMetric::OperatingMargin => ttm.margins.operating_margin,
        BenchmarkMetric::NetMargin => ttm.margins.net_margin,
        BenchmarkMetric::CashFlowMargin => ttm.margins.cash_flow_margin,
        BenchmarkMetric::ReturnOnEquity => ttm.ratios.return_on_equity,
        BenchmarkMetric::ReturnOnAssets => ttm.ratios.return_on_assets,
        BenchmarkMetric::AssetTurnover => ttm.ratios.asset_turnover,
        BenchmarkMetric::DebtToEquity => ttm.ratios.debt_to_equity,
        BenchmarkMetric::InterestCoverage => ttm.ratios.interest_coverage,
        BenchmarkMetric::CashConversion => ttm.ratios.cash_conversion,
    }
}

/// Classifies every benchmarked TTM margin and ratio.
///
/// Metrics without a configured range are omitted; an insufficient TTM window
/// yields no readings.
#[must_use]
pub fn classify_ttm(ttm: &TtmResult, table: &BenchmarkTable) -> Vec<BenchmarkReading> {
    if !ttm.sufficient_data {
        return Vec::new();
    }
    table
        .iter()
        .map(|(metric, range)| {
            let value = ttm_value(ttm, metric);
            BenchmarkReading {
                metric,
                value,
                range,
                position: BenchmarkPosition::of(value, &range),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ttm::ttm;
    use finmetrics_core::{Metric, PeriodRecord};

    fn quarters() -> Vec<PeriodRecord> {
        (0..4)
            .rev()
            .map(|i| {
                PeriodRecord::new(format!("Q{}", i + 1), i)
                    .with_metric(Metric::Revenue, 100.0)
                    .with_metric(Metric::GrossProfit, 40.0)
                    .with_metric(Metric::OperatingProfit, 15.0)
                    .with_metric(Metric::NetProfit, 5.0)
                    .with_metric(Metric::Equity, 200.0)
                    .with_metric(Metric::Debt, 300.0)
            })
            .collect()
    }

    #[test]
    fn test_position_bounds_inclusive() {
        let range = BenchmarkRange::new(0.1, 0.2);
        assert_eq!(BenchmarkPosition::of(0.05, &range), BenchmarkPosition::Below);
        assert_eq!(BenchmarkPosition::of(0.1, &range), BenchmarkPosition::Within);
        assert_eq!(BenchmarkPosition::of(0.2, &range), BenchmarkPosition::Within);
        assert_eq!(BenchmarkPosition::of(0.25, &range), BenchmarkPosition::Above);
    }

    #[test]
    fn test_classify_ttm() {
        let result = ttm(&quarters());
        let table = BenchmarkTable::new()
            .with_range(BenchmarkMetric::GrossMargin, 0.3, 0.5)
            .with_range(BenchmarkMetric::NetMargin, 0.08, 0.15)
            .with_range(BenchmarkMetric::DebtToEquity, 0.0, 1.0);
        let readings = classify_ttm(&result, &table);

        assert_eq!(readings.len(), 3);
        let gross = readings
            .iter()
            .find(|r| r.metric == BenchmarkMetric::GrossMargin)
            .unwrap();
        assert!((gross.value - 0.4).abs() < 1e-12);
        assert_eq!(gross.position, BenchmarkPosition::Within);

        let net = readings
            .iter()
            .find(|r| r.metric == BenchmarkMetric::NetMargin)
            .unwrap();
        assert_eq!(net.position, BenchmarkPosition::Below);

        let leverage = readings
            .iter()
            .find(|r| r.metric == BenchmarkMetric::DebtToEquity)
            .unwrap();
        assert!((leverage.value - 1.5).abs() < 1e-12);
        assert_eq!(leverage.position, BenchmarkPosition::Above);
    }

    #[test]
    fn test_empty_table_or_short_window() {
        let result = ttm(&quarters());
        assert!(classify_ttm(&result, &BenchmarkTable::new()).is_empty());

        let short = ttm(&quarters()[..3]);
        let table = BenchmarkTable::new().with_range(BenchmarkMetric::GrossMargin, 0.3, 0.5);
        assert!(classify_ttm(&short, &table).is_empty());
    }
}
