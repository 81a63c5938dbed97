use super::{AnalyzerResult, ColumnAnalyzer};
use crate::config::AnalysisConfig;
use crate::dataset::{Cell, Column};
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats::percentage;
use crate::types::SemanticType;
use crate::utils::parse_boolean_token;

/// Counts true/false values after token normalization.
///
/// Text that is not a boolean token is neither true nor false: it is counted
/// in `count` and in `missing_values`.
pub struct BooleanAnalyzer;

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanAnalysis {
    pub count: usize,
    pub true_count: usize,
    pub false_count: usize,
    pub true_percentage: f64,
    pub false_percentage: f64,
    pub missing_values: usize,
    pub unmapped_count: usize,
}

impl ColumnAnalyzer for BooleanAnalyzer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Boolean
    }

    fn analyze(&self, column: &Column, _config: &AnalysisConfig) -> AnalyzerResult {
        let mapped: Vec<Option<bool>> = column
            .non_missing()
            .map(|cell| match cell {
                Cell::Boolean(b) => Some(*b),
                other => other.render().and_then(|s| parse_boolean_token(&s)),
            })
            .collect();
        if mapped.is_empty() {
            return AnalyzerResult::Empty;
        }

        let count = mapped.len();
        let true_count = mapped.iter().filter(|v| **v == Some(true)).count();
        let false_count = mapped.iter().filter(|v| **v == Some(false)).count();
        let unmapped_count = count - true_count - false_count;

        AnalyzerResult::Boolean(BooleanAnalysis {
            count,
            true_count,
            false_count,
            true_percentage: percentage(true_count, count),
            false_percentage: percentage(false_count, count),
            missing_values: column.missing_count() + unmapped_count,
            unmapped_count,
        })
    }
}

impl ToReportValue for BooleanAnalysis {
    fn to_report_value(&self) -> ReportValue {
        let mut distribution = ReportMap::new();
        let mut entries = vec![
            ("True", self.true_count),
            ("False", self.false_count),
            ("nan", self.unmapped_count),
        ];
        // Keys follow the rendered cell labels; unmapped tokens are "nan".
        // Most frequent first, as a value count would list them.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        for (key, n) in entries.into_iter().filter(|(_, n)| *n > 0) {
            distribution.insert(key, n);
        }

        ReportMap::new()
            .with("count", self.count)
            .with("true_count", self.true_count)
            .with("false_count", self.false_count)
            .with("true_percentage", self.true_percentage)
            .with("false_percentage", self.false_percentage)
            .with("missing_values", self.missing_values)
            .with("distribution", distribution)
            .into()
    }
}
