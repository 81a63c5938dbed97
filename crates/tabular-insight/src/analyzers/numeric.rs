use super::{AnalyzerResult, ColumnAnalyzer};
use crate::config::AnalysisConfig;
use crate::dataset::Column;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats;
use crate::types::SemanticType;

/// Outlier fence multiplier for the IQR rule.
const IQR_FENCE: f64 = 1.5;

/// Descriptive statistics and IQR outliers for numeric columns.
pub struct NumericAnalyzer;

#[derive(Debug, Clone, PartialEq)]
pub struct NumericAnalysis {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: Option<f64>,
    pub variance: Option<f64>,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub coefficient_of_variation: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub missing_values: usize,
    pub unique_values: usize,
    pub zero_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub outlier_count: usize,
    pub outlier_percentage: f64,
    pub outlier_examples: Vec<f64>,
}

impl ColumnAnalyzer for NumericAnalyzer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Numeric
    }

    fn analyze(&self, column: &Column, config: &AnalysisConfig) -> AnalyzerResult {
        let values = column.numbers();
        if values.is_empty() {
            return AnalyzerResult::Empty;
        }

        let sorted = stats::sorted(&values);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let quantile = |q: f64| stats::quantile_sorted(&sorted, q).unwrap_or(min);
        let q1 = quantile(0.25);
        let q3 = quantile(0.75);
        let iqr = q3 - q1;
        let lower_fence = q1 - IQR_FENCE * iqr;
        let upper_fence = q3 + IQR_FENCE * iqr;

        let outliers: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| *v < lower_fence || *v > upper_fence)
            .collect();

        let mean = stats::mean(&values).unwrap_or(min);
        let std_dev = stats::std_dev(&values);
        let coefficient_of_variation = match std_dev {
            Some(std) if mean != 0.0 => Some(std / mean),
            _ => None,
        };

        AnalyzerResult::Numeric(NumericAnalysis {
            count: values.len(),
            mean,
            median: quantile(0.5),
            min,
            max,
            std_dev,
            variance: stats::variance(&values),
            q1,
            q3,
            iqr,
            coefficient_of_variation,
            skewness: stats::skewness(&values),
            kurtosis: stats::kurtosis(&values),
            missing_values: column.len() - values.len(),
            unique_values: stats::distinct_count(&values),
            zero_count: values.iter().filter(|v| **v == 0.0).count(),
            positive_count: values.iter().filter(|v| **v > 0.0).count(),
            negative_count: values.iter().filter(|v| **v < 0.0).count(),
            outlier_count: outliers.len(),
            outlier_percentage: stats::percentage(outliers.len(), values.len()),
            outlier_examples: outliers.into_iter().take(config.example_limit).collect(),
        })
    }
}

impl ToReportValue for NumericAnalysis {
    fn to_report_value(&self) -> ReportValue {
        ReportMap::new()
            .with("count", self.count)
            .with("mean", self.mean)
            .with("median", self.median)
            .with("min", self.min)
            .with("max", self.max)
            .with("std_dev", self.std_dev)
            .with("variance", self.variance)
            .with("q1", self.q1)
            .with("q3", self.q3)
            .with("iqr", self.iqr)
            .with("coefficient_of_variation", self.coefficient_of_variation)
            .with("skewness", self.skewness)
            .with("kurtosis", self.kurtosis)
            .with("missing_values", self.missing_values)
            .with("unique_values", self.unique_values)
            .with("zero_count", self.zero_count)
            .with("positive_count", self.positive_count)
            .with("negative_count", self.negative_count)
            .with("outlier_count", self.outlier_count)
            .with("outlier_percentage", self.outlier_percentage)
            .with("outlier_examples", self.outlier_examples.clone())
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn analyze(cells: Vec<Cell>) -> NumericAnalysis {
        let column = Column::new("value", cells);
        match NumericAnalyzer.analyze(&column, &AnalysisConfig::default()) {
            AnalyzerResult::Numeric(analysis) => analysis,
            other => panic!("expected numeric analysis, got {other:?}"),
        }
    }

    fn ints(values: &[i64]) -> Vec<Cell> {
        values.iter().map(|v| Cell::Integer(*v)).collect()
    }

    #[test]
    fn test_iqr_outlier_rule() {
        let analysis = analyze(ints(&[1, 2, 3, 4, 100]));

        assert_eq!(analysis.q1, 2.0);
        assert_eq!(analysis.q3, 4.0);
        assert_eq!(analysis.iqr, 2.0);
        assert_eq!(analysis.outlier_count, 1);
        assert_eq!(analysis.outlier_examples, vec![100.0]);
        assert_eq!(analysis.outlier_percentage, 20.0);
        assert_eq!(analysis.median, 3.0);
    }

    #[test]
    fn test_outlier_examples_keep_row_order() {
        let analysis = analyze(ints(&[500, 10, 11, 12, 13, 14, -400]));
        assert_eq!(analysis.outlier_examples, vec![500.0, -400.0]);
    }

    #[test]
    fn test_sign_counts_and_cv() {
        let analysis = analyze(ints(&[-2, 0, 0, 2]));
        assert_eq!(analysis.zero_count, 2);
        assert_eq!(analysis.positive_count, 1);
        assert_eq!(analysis.negative_count, 1);
        assert_eq!(analysis.mean, 0.0);
        assert_eq!(analysis.coefficient_of_variation, None);
        assert_eq!(analysis.unique_values, 3);
    }

    #[test]
    fn test_unparseable_text_is_dropped() {
        let analysis = analyze(vec![
            Cell::from("1.5"),
            Cell::from("abc"),
            Cell::Missing,
            Cell::from("2.5"),
        ]);
        assert_eq!(analysis.count, 2);
        assert_eq!(analysis.missing_values, 2);
        assert_eq!(analysis.mean, 2.0);
    }

    #[test]
    fn test_single_value() {
        let analysis = analyze(ints(&[7]));
        assert_eq!(analysis.std_dev, None);
        assert_eq!(analysis.variance, None);
        assert_eq!(analysis.skewness, None);
        assert_eq!(analysis.outlier_count, 0);
    }

    #[test]
    fn test_constant_column() {
        let analysis = analyze(ints(&[3, 3, 3, 3]));
        assert_eq!(analysis.std_dev, Some(0.0));
        assert_eq!(analysis.coefficient_of_variation, Some(0.0));
        assert_eq!(analysis.skewness, Some(0.0));
        assert_eq!(analysis.kurtosis, Some(0.0));
    }

    #[test]
    fn test_no_numbers_is_empty() {
        let column = Column::from_texts("value", [Some("x"), None]);
        assert!(NumericAnalyzer.analyze(&column, &AnalysisConfig::default()).is_empty());
    }
}
