//! DataFrame rendering of rolling TTM windows.

use finmetrics_analytics::TtmResult;
use finmetrics_core::Result;
use polars::prelude::*;
use tracing::debug;

/// Renders a rolling TTM sequence as a DataFrame, one row per window.
///
/// Rows keep the input order. `windowEnd` is the label of each window's most
/// recent quarter; growth columns are null where the window had no prior
/// window to compare against. `contiguous` is false for windows spanning a
/// gap in period indices.
///
/// # Errors
/// Returns [`AnalyticsError::Frame`](finmetrics_core::AnalyticsError::Frame)
/// if the frame cannot be assembled.
///
/// # Example
///
/// ```
/// use finmetrics::{Metric, PeriodSeries, PeriodType, rolling_ttm_series, ttm_frame};
///
/// let values = [10.0, 9.0, 8.0, 7.0, 6.0, 5.0];
/// let series = PeriodSeries::from_values(Metric::Revenue, &values, PeriodType::Quarterly);
/// let windows: Vec<_> = rolling_ttm_series(&series, 3).collect();
/// let df = ttm_frame(&windows).unwrap();
/// assert_eq!(df.height(), 3);
/// ```
pub fn ttm_frame(windows: &[TtmResult]) -> Result<DataFrame> {
    let column = |name: &str, value: fn(&TtmResult) -> f64| {
        Column::new(name.into(), windows.iter().map(value).collect::<Vec<f64>>())
    };
    let growth = |name: &str, value: fn(&TtmResult) -> Option<f64>| {
        Column::new(name.into(), windows.iter().map(value).collect::<Vec<Option<f64>>>())
    };

    let columns = vec![
        Column::new(
            "offset".into(),
            windows
                .iter()
                .map(|w| i64::try_from(w.offset).unwrap_or(i64::MAX))
                .collect::<Vec<i64>>(),
        ),
        Column::new(
            "windowEnd".into(),
            windows
                .iter()
                .map(|w| w.quarters.first().cloned().unwrap_or_default())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "sufficientData".into(),
            windows.iter().map(|w| w.sufficient_data).collect::<Vec<bool>>(),
        ),
        Column::new(
            "contiguous".into(),
            windows.iter().map(TtmResult::is_contiguous).collect::<Vec<bool>>(),
        ),
        column("revenue", |w| w.revenue),
        column("grossProfit", |w| w.gross_profit),
        column("operatingProfit", |w| w.operating_profit),
        column("netProfit", |w| w.net_profit),
        column("ebitda", |w| w.ebitda),
        column("freeCashFlow", |w| w.free_cash_flow),
        column("grossMargin", |w| w.margins.gross_margin),
        column("operatingMargin", |w| w.margins.operating_margin),
        column("netMargin", |w| w.margins.net_margin),
        column("cashFlowMargin", |w| w.margins.cash_flow_margin),
        column("returnOnEquity", |w| w.ratios.return_on_equity),
        column("returnOnAssets", |w| w.ratios.return_on_assets),
        column("debtToEquity", |w| w.ratios.debt_to_equity),
        growth("revenueGrowth", |w| w.growth.as_ref().map(|g| g.revenue)),
        growth("netProfitGrowth", |w| w.growth.as_ref().map(|g| g.net_profit)),
    ];

    let df = DataFrame::new(columns)?;
    debug!(rows = df.height(), "Rendered TTM windows as frame");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finmetrics_analytics::rolling_ttm_series;
    use finmetrics_core::{Metric, PeriodSeries, PeriodType};

    #[test]
    fn test_ttm_frame() {
        let values = [12.0, 11.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0];
        let series = PeriodSeries::from_values(Metric::Revenue, &values, PeriodType::Quarterly);
        let windows: Vec<TtmResult> = rolling_ttm_series(&series, 10).collect();
        let df = ttm_frame(&windows).unwrap();

        assert_eq!(df.height(), 6);
        let revenue = df.column("revenue").unwrap().f64().unwrap();
        assert_eq!(revenue.get(0), Some(42.0));
        assert_eq!(revenue.get(5), Some(22.0));

        let growth = df.column("revenueGrowth").unwrap().f64().unwrap();
        assert!(growth.get(0).is_some());
        assert!(growth.get(1).is_some());
        assert_eq!(growth.get(2), None);
        assert_eq!(growth.null_count(), 4);

        let end = df.column("windowEnd").unwrap().str().unwrap();
        assert_eq!(end.get(0), Some("P8"));

        let contiguous = df.column("contiguous").unwrap().bool().unwrap();
        assert_eq!(contiguous.get(0), Some(true));
    }

    #[test]
    fn test_empty_frame() {
        let df = ttm_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.column("netMargin").is_ok());
    }
}
