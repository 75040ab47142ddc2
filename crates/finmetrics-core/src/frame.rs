//! Polars `DataFrame` interchange for period series.
//!
//! Frames use one row per period, most recent first, with a `periodLabel`
//! string column, a `periodIndex` integer column and one numeric column per
//! metric.

use polars::prelude::*;
use tracing::debug;

use crate::{
    error::{AnalyticsError, Result},
    frequency::PeriodType,
    types::{Metric, PeriodRecord, PeriodSeries},
};

/// Name of the label column.
pub const LABEL_COLUMN: &str = "periodLabel";
/// Name of the ordering-key column.
pub const INDEX_COLUMN: &str = "periodIndex";

/// Builds a [`PeriodSeries`] from a DataFrame.
///
/// Every numeric column other than the index becomes a metric; null cells are
/// left out of the record rather than read as zero. Row order is preserved.
///
/// # Errors
/// Returns [`AnalyticsError::MissingColumn`] if the label or index column is
/// absent, or [`AnalyticsError::Frame`] if a column has an unusable type.
pub fn series_from_frame(df: &DataFrame, period_type: PeriodType) -> Result<PeriodSeries> {
    let labels = df
        .column(LABEL_COLUMN)
        .map_err(|_| AnalyticsError::MissingColumn(LABEL_COLUMN.to_string()))?
        .cast(&DataType::String)?;
    let labels = labels.str()?;
    let indices = df
        .column(INDEX_COLUMN)
        .map_err(|_| AnalyticsError::MissingColumn(INDEX_COLUMN.to_string()))?
        .cast(&DataType::Int64)?;
    let indices = indices.i64()?;

    let mut metric_columns = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == LABEL_COLUMN || name == INDEX_COLUMN || !is_numeric(column.dtype()) {
            continue;
        }
        let values = column.cast(&DataType::Float64)?;
        metric_columns.push((Metric::from(name), values));
    }

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let index = indices.get(row).ok_or_else(|| {
            AnalyticsError::Frame(format!("null {INDEX_COLUMN} at row {row}"))
        })?;
        let label = labels.get(row).unwrap_or_default();
        let mut record = PeriodRecord::new(label, index);
        for (metric, values) in &metric_columns {
            if let Some(value) = values.f64()?.get(row) {
                record = record.with_metric(metric.clone(), value);
            }
        }
        records.push(record);
    }

    debug!(
        rows = records.len(),
        metrics = metric_columns.len(),
        "Built period series from frame"
    );
    Ok(PeriodSeries::new(records, period_type))
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

/// Renders a [`PeriodSeries`] as a DataFrame with one column per metric.
///
/// Metrics absent from a record become nulls.
///
/// # Errors
/// Returns [`AnalyticsError::Frame`] if the frame cannot be assembled.
pub fn frame_from_series(series: &PeriodSeries) -> Result<DataFrame> {
    let mut metrics: Vec<Metric> = series
        .iter()
        .flat_map(|r| r.metrics().map(|(m, _)| m.clone()))
        .collect();
    metrics.sort();
    metrics.dedup();

    let mut columns = Vec::with_capacity(metrics.len() + 2);
    columns.push(Column::new(
        LABEL_COLUMN.into(),
        series
            .iter()
            .map(|r| r.period_label().to_string())
            .collect::<Vec<_>>(),
    ));
    columns.push(Column::new(
        INDEX_COLUMN.into(),
        series.iter().map(PeriodRecord::period_index).collect::<Vec<_>>(),
    ));
    for metric in &metrics {
        columns.push(Column::new(
            metric.as_str().into(),
            series.iter().map(|r| r.get(metric)).collect::<Vec<_>>(),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(LABEL_COLUMN.into(), vec!["Q2 FY24", "Q1 FY24"]),
            Column::new(INDEX_COLUMN.into(), vec![8i64, 7]),
            Column::new("revenue".into(), vec![963.0, 830.0]),
            Column::new("net_profit".into(), vec![Some(120.0), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_series_from_frame() {
        let series = series_from_frame(&sample_frame(), PeriodType::Quarterly).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.period_type(), PeriodType::Quarterly);
        assert_eq!(series[0].period_label(), "Q2 FY24");
        assert_eq!(series[0].period_index(), 8);
        assert_eq!(series[0].get(&Metric::Revenue), Some(963.0));
        assert_eq!(series[0].get(&Metric::NetProfit), Some(120.0));
        assert_eq!(series[1].get(&Metric::NetProfit), None);
    }

    #[test]
    fn test_missing_index_column() {
        let df = DataFrame::new(vec![Column::new(LABEL_COLUMN.into(), vec!["FY24"])]).unwrap();
        let err = series_from_frame(&df, PeriodType::Annual).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingColumn(_)));
    }

    #[test]
    fn test_frame_from_series() {
        let series = series_from_frame(&sample_frame(), PeriodType::Quarterly).unwrap();
        let df = frame_from_series(&series).unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("revenue").is_ok());
        assert!(df.column("netProfit").is_ok());
        assert_eq!(df.column("netProfit").unwrap().null_count(), 1);
    }
}
