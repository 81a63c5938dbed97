use super::value_counts;
use crate::config::AnalysisConfig;
use crate::dataset::Column;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats::percentage;

/// Number of duplicated values listed in `duplicate_examples`.
const DUPLICATE_EXAMPLE_LIMIT: usize = 5;

/// Duplicate and frequency profile of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    /// Rows whose value already appeared in an earlier row (missing counts as a value).
    pub duplicate_count: usize,
    /// Distinct non-missing values.
    pub unique_count: usize,
    pub duplicate_percentage: f64,
    pub most_common_value: ReportValue,
    pub most_common_count: usize,
    pub missing_values: usize,
    pub value_distribution: Option<Vec<(String, usize)>>,
    /// Values occurring more than once, most frequent first.
    pub duplicate_examples: Vec<(String, usize)>,
}

impl ColumnProfile {
    pub fn from_column(column: &Column, config: &AnalysisConfig) -> Self {
        let counts = value_counts(column);
        let missing_values = column.missing_count();
        let unique_count = counts.len();
        let distinct_with_missing = unique_count + usize::from(missing_values > 0);
        let duplicate_count = column.len() - distinct_with_missing;

        let (most_common_value, most_common_count) = counts
            .first()
            .map(|(cell, n)| (ReportValue::from(*cell), *n))
            .unwrap_or((ReportValue::Null, 0));

        let rendered: Vec<(String, usize)> = counts
            .iter()
            .filter_map(|(cell, n)| cell.render().map(|key| (key, *n)))
            .collect();

        let duplicate_examples = rendered
            .iter()
            .filter(|(_, n)| *n > 1)
            .take(DUPLICATE_EXAMPLE_LIMIT)
            .cloned()
            .collect();

        Self {
            duplicate_count,
            unique_count,
            duplicate_percentage: percentage(duplicate_count, column.len()),
            most_common_value,
            most_common_count,
            missing_values,
            value_distribution: config.include_value_distribution.then_some(rendered),
            duplicate_examples,
        }
    }
}

impl ToReportValue for ColumnProfile {
    fn to_report_value(&self) -> ReportValue {
        let mut node = ReportMap::new()
            .with("duplicate_count", self.duplicate_count)
            .with("unique_count", self.unique_count)
            .with("duplicate_percentage", self.duplicate_percentage)
            .with("most_common_value", self.most_common_value.clone())
            .with("most_common_count", self.most_common_count)
            .with("missing_values", self.missing_values);

        if let Some(distribution) = &self.value_distribution {
            node.insert(
                "value_distribution",
                distribution.iter().cloned().collect::<ReportMap>(),
            );
        }
        if !self.duplicate_examples.is_empty() {
            node.insert(
                "duplicate_examples",
                self.duplicate_examples.iter().cloned().collect::<ReportMap>(),
            );
        }
        node.into()
    }
}
