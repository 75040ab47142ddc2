//! Trailing-twelve-month aggregation.
//!
//! A TTM window is the four most recent quarterly records (`records[0..4]`,
//! most recent first). Short series never error: results carry
//! `sufficient_data = false` and zeroed values instead. Windows whose period
//! indices are not consecutive are still summed but flagged, since they span
//! more than a year.

use finmetrics_core::{Metric, PeriodRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::validate::window_gaps;

/// Records in one TTM window.
pub const TTM_QUARTERS: usize = 4;

/// Sum of a flow metric over one TTM window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtmSum {
    /// Sum of the four most recent values, or 0 when insufficient.
    pub value: f64,
    /// False when fewer than four records were available.
    pub sufficient_data: bool,
    /// False when the window's period indices are not consecutive.
    pub contiguous: bool,
}

/// TTM-based margins, as fractions of TTM revenue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtmMargins {
    /// Gross profit / revenue.
    pub gross_margin: f64,
    /// Operating profit / revenue.
    pub operating_margin: f64,
    /// Net profit / revenue.
    pub net_margin: f64,
    /// Operating cash flow / revenue.
    pub cash_flow_margin: f64,
    /// False when fewer than four records were available.
    pub sufficient_data: bool,
    /// Sentinel substitutions made while deriving the margins.
    pub warnings: Vec<String>,
}

/// Growth of one metric between the current and prior TTM windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricGrowth {
    /// Sum over `records[0..4]`.
    pub current: f64,
    /// Sum over `records[4..8]`.
    pub prior: f64,
    /// `(current - prior) / |prior|`; 0 when the prior window is zero or missing.
    pub growth: f64,
    /// False when fewer than eight records were available.
    pub sufficient_data: bool,
    /// False when the eight records' period indices are not consecutive.
    pub contiguous: bool,
}

/// TTM-over-TTM growth for the headline flow metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtmGrowth {
    /// Revenue growth.
    pub revenue: f64,
    /// Gross profit growth.
    pub gross_profit: f64,
    /// Operating profit growth.
    pub operating_profit: f64,
    /// Net profit growth.
    pub net_profit: f64,
    /// Operating cash flow growth.
    pub operating_cash_flow: f64,
    /// False when fewer than eight records were available.
    pub sufficient_data: bool,
    /// False when the eight records' period indices are not consecutive.
    pub contiguous: bool,
}

/// TTM-based return, leverage and efficiency ratios.
///
/// ROE, ROA and asset turnover divide by the average of the latest two
/// balance-sheet values; debt to equity uses the latest values only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtmRatios {
    /// TTM net profit / average equity.
    pub return_on_equity: f64,
    /// TTM net profit / average total assets.
    pub return_on_assets: f64,
    /// TTM revenue / average total assets.
    pub asset_turnover: f64,
    /// Latest debt / latest equity.
    pub debt_to_equity: f64,
    /// TTM operating profit / TTM interest.
    pub interest_coverage: f64,
    /// TTM operating cash flow / TTM net profit.
    pub cash_conversion: f64,
    /// False when fewer than four records were available.
    pub sufficient_data: bool,
    /// Sentinel substitutions made while deriving the ratios.
    pub warnings: Vec<String>,
}

/// Complete TTM view of one window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtmResult {
    /// Offset of the window's most recent record within the series.
    pub offset: usize,
    /// Labels of the records in the window, most recent first.
    pub quarters: Vec<String>,
    /// TTM revenue.
    pub revenue: f64,
    /// TTM gross profit.
    pub gross_profit: f64,
    /// TTM operating profit.
    pub operating_profit: f64,
    /// TTM net profit.
    pub net_profit: f64,
    /// TTM interest expense.
    pub interest: f64,
    /// TTM depreciation.
    pub depreciation: f64,
    /// TTM tax.
    pub tax: f64,
    /// TTM operating cash flow.
    pub operating_cash_flow: f64,
    /// TTM capital expenditure.
    pub capex: f64,
    /// Operating profit plus depreciation.
    pub ebitda: f64,
    /// Operating cash flow minus capex.
    pub free_cash_flow: f64,
    /// Margins for the window.
    pub margins: TtmMargins,
    /// Ratios for the window.
    pub ratios: TtmRatios,
    /// Growth versus the preceding window, when eight records were available.
    pub growth: Option<TtmGrowth>,
    /// False when fewer than four records were available.
    pub sufficient_data: bool,
    /// Gaps or misordering between the records the window and its growth
    /// comparison cover.
    pub warnings: Vec<String>,
}

impl TtmResult {
    /// True when no gap was found inside the window or its growth comparison.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.warnings.is_empty()
    }

    /// All warnings raised for this window.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.warnings
            .iter()
            .chain(self.margins.warnings.iter())
            .chain(self.ratios.warnings.iter())
            .map(String::as_str)
    }
}

/// Sums `metric` over the four most recent records.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::ttm::ttm_sum;
/// use finmetrics_core::{Metric, PeriodSeries, PeriodType};
///
/// let series = PeriodSeries::from_values(
///     Metric::Revenue,
///     &[963.0, 830.0, 750.0, 680.0],
///     PeriodType::Quarterly,
/// );
/// let sum = ttm_sum(&series, &Metric::Revenue);
/// assert!(sum.sufficient_data);
/// assert_eq!(sum.value, 3223.0);
/// ```
#[must_use]
pub fn ttm_sum(records: &[PeriodRecord], metric: &Metric) -> TtmSum {
    if records.len() < TTM_QUARTERS {
        debug!(
            metric = %metric,
            available = records.len(),
            "Insufficient records for TTM sum"
        );
        return TtmSum::default();
    }
    let window = &records[..TTM_QUARTERS];
    TtmSum {
        value: window_sum(window, metric),
        sufficient_data: true,
        contiguous: window_gaps(window).is_empty(),
    }
}

/// Derives TTM margins over the four most recent records.
///
/// Zero TTM revenue yields zero margins and a warning.
#[must_use]
pub fn ttm_margins(records: &[PeriodRecord]) -> TtmMargins {
    if records.len() < TTM_QUARTERS {
        return TtmMargins::default();
    }
    let window = &records[..TTM_QUARTERS];
    let revenue = window_sum(window, &Metric::Revenue);
    let mut warnings = Vec::new();

    if revenue == 0.0 {
        warnings.push("TTM revenue is zero; margins set to 0".to_string());
        return TtmMargins {
            sufficient_data: true,
            warnings,
            ..TtmMargins::default()
        };
    }

    TtmMargins {
        gross_margin: window_sum(window, &Metric::GrossProfit) / revenue,
        operating_margin: window_sum(window, &Metric::OperatingProfit) / revenue,
        net_margin: window_sum(window, &Metric::NetProfit) / revenue,
        cash_flow_margin: window_sum(window, &Metric::OperatingCashFlow) / revenue,
        sufficient_data: true,
        warnings,
    }
}

/// Compares the current TTM window of `metric` with the prior one.
#[must_use]
pub fn ttm_metric_growth(records: &[PeriodRecord], metric: &Metric) -> MetricGrowth {
    if records.len() < 2 * TTM_QUARTERS {
        debug!(
            metric = %metric,
            available = records.len(),
            "Insufficient records for TTM growth"
        );
        return MetricGrowth::default();
    }
    let current = window_sum(&records[..TTM_QUARTERS], metric);
    let prior = window_sum(&records[TTM_QUARTERS..2 * TTM_QUARTERS], metric);
    let growth = if prior == 0.0 {
        0.0
    } else {
        (current - prior) / prior.abs()
    };
    MetricGrowth {
        current,
        prior,
        growth,
        sufficient_data: true,
        contiguous: window_gaps(&records[..2 * TTM_QUARTERS]).is_empty(),
    }
}

/// TTM-over-TTM growth; requires eight records, otherwise zeros.
#[must_use]
pub fn ttm_growth(records: &[PeriodRecord]) -> TtmGrowth {
    if records.len() < 2 * TTM_QUARTERS {
        return TtmGrowth::default();
    }
    let growth = |metric: Metric| ttm_metric_growth(records, &metric).growth;
    TtmGrowth {
        revenue: growth(Metric::Revenue),
        gross_profit: growth(Metric::GrossProfit),
        operating_profit: growth(Metric::OperatingProfit),
        net_profit: growth(Metric::NetProfit),
        operating_cash_flow: growth(Metric::OperatingCashFlow),
        sufficient_data: true,
        contiguous: window_gaps(&records[..2 * TTM_QUARTERS]).is_empty(),
    }
}

/// Derives TTM ratios over the four most recent records.
#[must_use]
pub fn ttm_ratios(records: &[PeriodRecord]) -> TtmRatios {
    if records.len() < TTM_QUARTERS {
        return TtmRatios::default();
    }
    let window = &records[..TTM_QUARTERS];
    let revenue = window_sum(window, &Metric::Revenue);
    let net_profit = window_sum(window, &Metric::NetProfit);
    let operating_profit = window_sum(window, &Metric::OperatingProfit);
    let interest = window_sum(window, &Metric::Interest);
    let operating_cash_flow = window_sum(window, &Metric::OperatingCashFlow);

    let average_equity = latest_average(records, &Metric::Equity);
    let average_assets = latest_average(records, &Metric::TotalAssets);
    let latest = &records[0];

    let mut warnings = Vec::new();
    let mut ratio = |name: &str, numerator: f64, denominator: f64| {
        guarded_ratio(name, numerator, denominator, &mut warnings)
    };

    TtmRatios {
        return_on_equity: ratio("return on equity", net_profit, average_equity),
        return_on_assets: ratio("return on assets", net_profit, average_assets),
        asset_turnover: ratio("asset turnover", revenue, average_assets),
        debt_to_equity: ratio(
            "debt to equity",
            latest.value(&Metric::Debt),
            latest.value(&Metric::Equity),
        ),
        interest_coverage: ratio("interest coverage", operating_profit, interest),
        cash_conversion: ratio("cash conversion", operating_cash_flow, net_profit),
        sufficient_data: true,
        warnings,
    }
}

/// Builds the full TTM view of the most recent window.
#[must_use]
pub fn ttm(records: &[PeriodRecord]) -> TtmResult {
    ttm_at(records, 0)
}

/// Builds the full TTM view of the window starting `offset` records back.
#[must_use]
pub fn ttm_at(records: &[PeriodRecord], offset: usize) -> TtmResult {
    let view = records.get(offset..).unwrap_or_default();
    let quarters = view
        .iter()
        .take(TTM_QUARTERS)
        .map(|r| r.period_label().to_string())
        .collect();

    if view.len() < TTM_QUARTERS {
        debug!(offset, available = view.len(), "Insufficient records for TTM window");
        return TtmResult {
            offset,
            quarters,
            ..TtmResult::default()
        };
    }

    let window = &view[..TTM_QUARTERS];
    let sum = |metric: Metric| window_sum(window, &metric);
    let operating_profit = sum(Metric::OperatingProfit);
    let depreciation = sum(Metric::Depreciation);
    let operating_cash_flow = sum(Metric::OperatingCashFlow);
    let capex = sum(Metric::Capex);

    let growth = (view.len() >= 2 * TTM_QUARTERS).then(|| ttm_growth(view));
    let covered = if growth.is_some() { 2 * TTM_QUARTERS } else { TTM_QUARTERS };
    let warnings: Vec<String> = window_gaps(&view[..covered])
        .into_iter()
        .map(|gap| format!("gap inside TTM window: {gap}"))
        .collect();
    if !warnings.is_empty() {
        warn!(offset, gaps = warnings.len(), "TTM window spans non-consecutive periods");
    }

    trace!(offset, has_growth = growth.is_some(), "Computed TTM window");
    TtmResult {
        offset,
        quarters,
        revenue: sum(Metric::Revenue),
        gross_profit: sum(Metric::GrossProfit),
        operating_profit,
        net_profit: sum(Metric::NetProfit),
        interest: sum(Metric::Interest),
        depreciation,
        tax: sum(Metric::Tax),
        operating_cash_flow,
        capex,
        ebitda: operating_profit + depreciation,
        free_cash_flow: operating_cash_flow - capex,
        margins: ttm_margins(view),
        ratios: ttm_ratios(view),
        growth,
        sufficient_data: true,
        warnings,
    }
}

/// Produces up to `count` successive TTM windows, sliding one record at a time.
///
/// The iterator is lazy and finite; clone it to restart from the first window.
///
/// # Example
///
/// ```
/// use finmetrics_analytics::ttm::rolling_ttm_series;
/// use finmetrics_core::{Metric, PeriodSeries, PeriodType};
///
/// let values = [10.0, 9.0, 8.0, 7.0, 6.0, 5.0];
/// let series = PeriodSeries::from_values(Metric::Revenue, &values, PeriodType::Quarterly);
/// let revenues: Vec<f64> = rolling_ttm_series(&series, 5).map(|t| t.revenue).collect();
/// assert_eq!(revenues, vec![34.0, 30.0, 26.0]);
/// ```
#[must_use]
pub fn rolling_ttm_series(records: &[PeriodRecord], count: usize) -> RollingTtm<'_> {
    let available = (records.len() + 1).saturating_sub(TTM_QUARTERS);
    RollingTtm {
        records,
        next: 0,
        end: count.min(available),
    }
}

/// Lazy sequence of TTM windows, see [`rolling_ttm_series`].
#[derive(Clone, Debug)]
pub struct RollingTtm<'a> {
    records: &'a [PeriodRecord],
    next: usize,
    end: usize,
}

impl Iterator for RollingTtm<'_> {
    type Item = TtmResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let result = ttm_at(self.records, self.next);
        self.next += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingTtm<'_> {}

fn window_sum(window: &[PeriodRecord], metric: &Metric) -> f64 {
    window.iter().map(|r| r.value(metric)).sum()
}

/// Average of the latest two values of a balance-sheet metric, or the latest
/// value alone when only one record exists.
fn latest_average(records: &[PeriodRecord], metric: &Metric) -> f64 {
    match records {
        [latest, previous, ..] => (latest.value(metric) + previous.value(metric)) / 2.0,
        [latest] => latest.value(metric),
        [] => 0.0,
    }
}

fn guarded_ratio(name: &str, numerator: f64, denominator: f64, warnings: &mut Vec<String>) -> f64 {
    if denominator == 0.0 {
        warnings.push(format!("{name}: zero denominator; set to 0"));
        return 0.0;
    }
    numerator / denominator
}
