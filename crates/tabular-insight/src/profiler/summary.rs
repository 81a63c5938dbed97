use super::value_counts;
use crate::dataset::{Column, StorageType};
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats;

/// Storage-level summary of a numeric column, independent of its semantic type.
///
/// Every statistic is `None` when the column has no usable values (or, for
/// `std`, fewer than two).
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub missing_values: usize,
    pub zero_values: usize,
}

impl NumericSummary {
    pub fn from_column(column: &Column) -> Self {
        let values = column.numbers();
        let sorted = stats::sorted(&values);

        // Boolean storage reports no zeros
        let zero_values = match column.storage() {
            StorageType::Boolean => 0,
            _ => values.iter().filter(|v| **v == 0.0).count(),
        };

        Self {
            mean: stats::mean(&values),
            median: stats::quantile_sorted(&sorted, 0.5),
            min: sorted.first().copied(),
            max: sorted.last().copied(),
            std: stats::std_dev(&values),
            q1: stats::quantile_sorted(&sorted, 0.25),
            q3: stats::quantile_sorted(&sorted, 0.75),
            missing_values: column.missing_count(),
            zero_values,
        }
    }
}

impl ToReportValue for NumericSummary {
    fn to_report_value(&self) -> ReportValue {
        ReportMap::new()
            .with("mean", self.mean)
            .with("median", self.median)
            .with("min", self.min)
            .with("max", self.max)
            .with("std", self.std)
            .with("q1", self.q1)
            .with("q3", self.q3)
            .with("missing_values", self.missing_values)
            .with("zero_values", self.zero_values)
            .into()
    }
}

/// Frequency summary of a text column.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub unique_values: usize,
    pub value_distribution: Vec<(String, usize)>,
    pub most_common_value: Option<String>,
    pub most_common_count: usize,
    pub missing_values: usize,
}

impl CategoricalSummary {
    pub fn from_column(column: &Column) -> Self {
        let value_distribution: Vec<(String, usize)> = value_counts(column)
            .into_iter()
            .filter_map(|(cell, n)| cell.render().map(|key| (key, n)))
            .collect();
        let (most_common_value, most_common_count) = value_distribution
            .first()
            .map(|(value, n)| (Some(value.clone()), *n))
            .unwrap_or((None, 0));

        Self {
            unique_values: value_distribution.len(),
            value_distribution,
            most_common_value,
            most_common_count,
            missing_values: column.missing_count(),
        }
    }
}

impl ToReportValue for CategoricalSummary {
    fn to_report_value(&self) -> ReportValue {
        let distribution: ReportMap = self.value_distribution.iter().cloned().collect();
        ReportMap::new()
            .with("unique_values", self.unique_values)
            .with("value_distribution", distribution)
            .with("most_common_value", self.most_common_value.clone())
            .with("most_common_count", self.most_common_count)
            .with("missing_values", self.missing_values)
            .into()
    }
}
