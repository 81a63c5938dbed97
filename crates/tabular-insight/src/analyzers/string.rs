use super::{AnalyzerResult, ColumnAnalyzer, example_values};
use crate::config::AnalysisConfig;
use crate::dataset::Column;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats;
use crate::types::SemanticType;

/// Length distribution and frequency summary for free text.
pub struct StringAnalyzer;

#[derive(Debug, Clone, PartialEq)]
pub struct StringAnalysis {
    pub count: usize,
    pub unique_values: usize,
    pub most_common_value: String,
    pub most_common_count: usize,
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub median_length: f64,
    pub empty_string_count: usize,
    pub whitespace_ratio: f64,
    pub example_values: Vec<String>,
}

impl ColumnAnalyzer for StringAnalyzer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::String
    }

    fn analyze(&self, column: &Column, config: &AnalysisConfig) -> AnalyzerResult {
        let values = column.rendered();
        if values.is_empty() {
            return AnalyzerResult::Empty;
        }

        let counts = stats::value_counts_by(values.iter(), |a, b| a.cmp(b));
        let (most_common_value, most_common_count) = counts
            .first()
            .map(|(value, n)| ((*value).clone(), *n))
            .unwrap_or_default();

        let lengths: Vec<usize> = values.iter().map(|v| v.chars().count()).collect();
        let lengths_f64: Vec<f64> = lengths.iter().map(|l| *l as f64).collect();
        let blank = values.iter().filter(|v| v.trim().is_empty()).count();

        AnalyzerResult::String(StringAnalysis {
            count: values.len(),
            unique_values: counts.len(),
            most_common_value,
            most_common_count,
            avg_length: stats::mean(&lengths_f64).unwrap_or_default(),
            min_length: lengths.iter().copied().min().unwrap_or_default(),
            max_length: lengths.iter().copied().max().unwrap_or_default(),
            median_length: stats::median(&lengths_f64).unwrap_or_default(),
            empty_string_count: values.iter().filter(|v| v.is_empty()).count(),
            whitespace_ratio: blank as f64 / values.len() as f64,
            example_values: example_values(column, config.example_limit),
        })
    }
}

impl ToReportValue for StringAnalysis {
    fn to_report_value(&self) -> ReportValue {
        ReportMap::new()
            .with("count", self.count)
            .with("unique_values", self.unique_values)
            .with("most_common_value", self.most_common_value.as_str())
            .with("most_common_count", self.most_common_count)
            .with("avg_length", self.avg_length)
            .with("min_length", self.min_length)
            .with("max_length", self.max_length)
            .with("median_length", self.median_length)
            .with("empty_string_count", self.empty_string_count)
            .with("whitespace_ratio", self.whitespace_ratio)
            .with("example_values", self.example_values.clone())
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_summary() {
        let column = Column::from_texts(
            "city",
            [
                Some("Paris"),
                Some("Rome"),
                Some("Paris"),
                None,
                Some(""),
                Some("   "),
                Some("Oslo"),
            ],
        );
        let AnalyzerResult::String(analysis) =
            StringAnalyzer.analyze(&column, &AnalysisConfig::default())
        else {
            panic!("expected string analysis");
        };

        assert_eq!(analysis.count, 6);
        assert_eq!(analysis.unique_values, 5);
        assert_eq!(analysis.most_common_value, "Paris");
        assert_eq!(analysis.most_common_count, 2);
        assert_eq!(analysis.min_length, 0);
        assert_eq!(analysis.max_length, 5);
        assert_eq!(analysis.median_length, 4.0);
        assert_eq!(analysis.empty_string_count, 1);
        assert!((analysis.whitespace_ratio - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(
            analysis.example_values,
            vec!["Paris", "Rome", "Paris", "", "   "]
        );
    }

    #[test]
    fn test_mode_tie_prefers_smallest() {
        let column = Column::from_texts("c", [Some("b"), Some("a")]);
        let AnalyzerResult::String(analysis) =
            StringAnalyzer.analyze(&column, &AnalysisConfig::default())
        else {
            panic!("expected string analysis");
        };
        assert_eq!(analysis.most_common_value, "a");
    }

    #[test]
    fn test_lengths_count_characters() {
        let column = Column::from_texts("c", [Some("héllo")]);
        let AnalyzerResult::String(analysis) =
            StringAnalyzer.analyze(&column, &AnalysisConfig::default())
        else {
            panic!("expected string analysis");
        };
        assert_eq!(analysis.max_length, 5);
    }

    #[test]
    fn test_all_missing_is_empty() {
        let column = Column::from_texts("c", [None]);
        assert!(StringAnalyzer.analyze(&column, &AnalysisConfig::default()).is_empty());
    }
}
