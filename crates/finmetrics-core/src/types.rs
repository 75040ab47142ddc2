//! Core data types for periodic financial observations.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Metric`] - Named financial-statement line item
//! - [`PeriodRecord`] - One observation for a reporting period
//! - [`PeriodSeries`] - Ordered records, most recent first

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::frequency::PeriodType;

/// A named numeric metric carried by a [`PeriodRecord`].
///
/// Units are opaque to the engine; they only need to be consistent within a
/// series. Metrics serialize as their camelCase name so a metric map renders
/// as a plain JSON object.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metric {
    /// Total revenue.
    Revenue,
    /// Gross profit.
    GrossProfit,
    /// Operating profit (EBIT).
    OperatingProfit,
    /// Net profit.
    NetProfit,
    /// Total assets (balance sheet).
    TotalAssets,
    /// Shareholders' equity (balance sheet).
    Equity,
    /// Total debt (balance sheet).
    Debt,
    /// Interest expense.
    Interest,
    /// Depreciation and amortization.
    Depreciation,
    /// Tax expense.
    Tax,
    /// Operating cash flow.
    OperatingCashFlow,
    /// Capital expenditures, as a positive outflow.
    Capex,
    /// Working capital (balance sheet).
    WorkingCapital,
    /// Cash and equivalents (balance sheet).
    Cash,
    /// Any other caller-defined metric.
    Custom(String),
}

impl Metric {
    /// Returns the camelCase name of the metric.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Revenue => "revenue",
            Self::GrossProfit => "grossProfit",
            Self::OperatingProfit => "operatingProfit",
            Self::NetProfit => "netProfit",
            Self::TotalAssets => "totalAssets",
            Self::Equity => "equity",
            Self::Debt => "debt",
            Self::Interest => "interest",
            Self::Depreciation => "depreciation",
            Self::Tax => "tax",
            Self::OperatingCashFlow => "operatingCashFlow",
            Self::Capex => "capex",
            Self::WorkingCapital => "workingCapital",
            Self::Cash => "cash",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = std::convert::Infallible;

    /// Parses camelCase or snake_case names; unknown names become [`Metric::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        let metric = match normalized.as_str() {
            "revenue" | "sales" => Self::Revenue,
            "grossprofit" => Self::GrossProfit,
            "operatingprofit" | "ebit" => Self::OperatingProfit,
            "netprofit" | "netincome" => Self::NetProfit,
            "totalassets" | "assets" => Self::TotalAssets,
            "equity" => Self::Equity,
            "debt" => Self::Debt,
            "interest" => Self::Interest,
            "depreciation" => Self::Depreciation,
            "tax" => Self::Tax,
            "operatingcashflow" => Self::OperatingCashFlow,
            "capex" => Self::Capex,
            "workingcapital" => Self::WorkingCapital,
            "cash" => Self::Cash,
            _ => Self::Custom(s.to_string()),
        };
        Ok(metric)
    }
}

impl From<&str> for Metric {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_else(|never| match never {})
    }
}

impl From<String> for Metric {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.as_str().to_string()
    }
}

/// One observation for a reporting period.
///
/// Records are immutable once built; use the `with_*` builders while
/// assembling them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    period_label: String,
    period_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period_end: Option<NaiveDate>,
    #[serde(default)]
    metrics: BTreeMap<Metric, f64>,
}

impl PeriodRecord {
    /// Creates a record with no metrics.
    #[must_use]
    pub fn new(period_label: impl Into<String>, period_index: i64) -> Self {
        Self {
            period_label: period_label.into(),
            period_index,
            period_end: None,
            metrics: BTreeMap::new(),
        }
    }

    /// Sets a metric value.
    #[must_use]
    pub fn with_metric(mut self, metric: impl Into<Metric>, value: f64) -> Self {
        self.metrics.insert(metric.into(), value);
        self
    }

    /// Sets the period end date.
    #[must_use]
    pub fn with_period_end(mut self, period_end: NaiveDate) -> Self {
        self.period_end = Some(period_end);
        self
    }

    /// Display label, e.g. "Q1 FY24".
    #[must_use]
    pub fn period_label(&self) -> &str {
        &self.period_label
    }

    /// Caller-assigned ordering key.
    #[must_use]
    pub const fn period_index(&self) -> i64 {
        self.period_index
    }

    /// End date of the reporting period, if known.
    #[must_use]
    pub const fn period_end(&self) -> Option<NaiveDate> {
        self.period_end
    }

    /// Returns the metric value if present.
    #[must_use]
    pub fn get(&self, metric: &Metric) -> Option<f64> {
        self.metrics.get(metric).copied()
    }

    /// Returns the metric value, reading a missing metric as zero.
    #[must_use]
    pub fn value(&self, metric: &Metric) -> f64 {
        self.get(metric).unwrap_or(0.0)
    }

    /// Iterates over all metrics in name order.
    pub fn metrics(&self) -> impl Iterator<Item = (&Metric, f64)> {
        self.metrics.iter().map(|(m, v)| (m, *v))
    }
}

/// Ordered sequence of [`PeriodRecord`]s, most recent first.
///
/// Index 0 is the latest period. The order supplied by the caller is kept as
/// is; use [`PeriodSeries::from_unordered`] to sort by `period_index`, and the
/// validator to check a caller-ordered series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSeries {
    records: Vec<PeriodRecord>,
    #[serde(default)]
    period_type: PeriodType,
}

impl PeriodSeries {
    /// Creates a series from records already ordered most recent first.
    #[must_use]
    pub const fn new(records: Vec<PeriodRecord>, period_type: PeriodType) -> Self {
        Self {
            records,
            period_type,
        }
    }

    /// Creates a series, sorting records by descending `period_index`.
    #[must_use]
    pub fn from_unordered(mut records: Vec<PeriodRecord>, period_type: PeriodType) -> Self {
        records.sort_by(|a, b| b.period_index.cmp(&a.period_index));
        Self::new(records, period_type)
    }

    /// Creates a series holding one metric, from values ordered most recent first.
    ///
    /// Labels are `P{index}` and indices count down from `len - 1` to 0.
    #[must_use]
    pub fn from_values(metric: impl Into<Metric>, values: &[f64], period_type: PeriodType) -> Self {
        let metric = metric.into();
        let n = values.len() as i64;
        let records = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let index = n - 1 - i as i64;
                PeriodRecord::new(format!("P{index}"), index).with_metric(metric.clone(), *v)
            })
            .collect();
        Self::new(records, period_type)
    }

    /// Reporting period type of the records.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// The records, most recent first.
    #[must_use]
    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    /// The latest record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&PeriodRecord> {
        self.records.first()
    }

    /// Metric values most recent first; missing values read as zero.
    #[must_use]
    pub fn values(&self, metric: &Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }

    /// Metric values oldest first, the order the statistical routines expect.
    #[must_use]
    pub fn chronological(&self, metric: &Metric) -> Vec<f64> {
        self.records.iter().rev().map(|r| r.value(metric)).collect()
    }

    /// Period labels oldest first.
    #[must_use]
    pub fn chronological_labels(&self) -> Vec<String> {
        self.records
            .iter()
            .rev()
            .map(|r| r.period_label.clone())
            .collect()
    }

    /// Consumes the series and returns the records.
    #[must_use]
    pub fn into_inner(self) -> Vec<PeriodRecord> {
        self.records
    }
}

impl Deref for PeriodSeries {
    type Target = [PeriodRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl AsRef<[PeriodRecord]> for PeriodSeries {
    fn as_ref(&self) -> &[PeriodRecord] {
        &self.records
    }
}

impl IntoIterator for PeriodSeries {
    type Item = PeriodRecord;
    type IntoIter = std::vec::IntoIter<PeriodRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<PeriodRecord> for PeriodSeries {
    fn from_iter<I: IntoIterator<Item = PeriodRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect(), PeriodType::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parsing() {
        assert_eq!(Metric::from("netProfit"), Metric::NetProfit);
        assert_eq!(Metric::from("net_profit"), Metric::NetProfit);
        assert_eq!(Metric::from("operating_cash_flow"), Metric::OperatingCashFlow);
        assert_eq!(Metric::from("ebitda"), Metric::Custom("ebitda".to_string()));
        assert_eq!(Metric::GrossProfit.to_string(), "grossProfit");
    }

    #[test]
    fn test_record_serializes_metrics_as_object() {
        let record = PeriodRecord::new("Q1 FY24", 7)
            .with_metric(Metric::Revenue, 963.0)
            .with_metric("segmentSales", 12.5);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["periodLabel"], "Q1 FY24");
        assert_eq!(json["metrics"]["revenue"], 963.0);
        assert_eq!(json["metrics"]["segmentSales"], 12.5);

        let back: PeriodRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_missing_metric_reads_as_zero() {
        let record = PeriodRecord::new("FY24", 1).with_metric(Metric::Revenue, 10.0);
        assert_eq!(record.get(&Metric::Tax), None);
        assert_eq!(record.value(&Metric::Tax), 0.0);
    }

    #[test]
    fn test_from_unordered_sorts_most_recent_first() {
        let series = PeriodSeries::from_unordered(
            vec![
                PeriodRecord::new("FY22", 22),
                PeriodRecord::new("FY24", 24),
                PeriodRecord::new("FY23", 23),
            ],
            PeriodType::Annual,
        );
        let labels: Vec<&str> = series.iter().map(PeriodRecord::period_label).collect();
        assert_eq!(labels, vec!["FY24", "FY23", "FY22"]);
    }

    #[test]
    fn test_values_and_chronological() {
        let series = PeriodSeries::from_values(
            Metric::Revenue,
            &[963.0, 830.0, 750.0],
            PeriodType::Quarterly,
        );
        assert_eq!(series.values(&Metric::Revenue), vec![963.0, 830.0, 750.0]);
        assert_eq!(series.chronological(&Metric::Revenue), vec![750.0, 830.0, 963.0]);
        assert_eq!(series.latest().map(PeriodRecord::period_index), Some(2));
        assert_eq!(series.chronological_labels(), vec!["P0", "P1", "P2"]);
    }
}
