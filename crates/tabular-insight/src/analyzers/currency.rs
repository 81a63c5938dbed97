use super::{AnalyzerFailure, AnalyzerResult, ColumnAnalyzer, example_values};
use crate::config::AnalysisConfig;
use crate::dataset::Column;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats;
use crate::types::SemanticType;
use crate::utils::{leading_symbol, parse_currency_amount};
use tracing::debug;

/// Detects the dominant currency symbol and summarizes the amounts.
pub struct CurrencyAnalyzer;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyAnalysis {
    pub symbol: String,
    pub count: usize,
    pub total_sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: Option<f64>,
    pub q1: f64,
    pub q3: f64,
    pub unique_values: usize,
    pub missing_values: usize,
    pub example_values: Vec<String>,
}

impl ColumnAnalyzer for CurrencyAnalyzer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Currency
    }

    fn analyze(&self, column: &Column, config: &AnalysisConfig) -> AnalyzerResult {
        if column.is_empty() {
            return AnalyzerResult::Failed(AnalyzerFailure::new("Empty series"));
        }

        let raw = column.rendered();
        let missing_values = column.missing_count();
        if raw.is_empty() {
            return AnalyzerResult::Failed(AnalyzerFailure::new("No valid currency values"));
        }

        let symbol = dominant_symbol(&raw);
        let examples = example_values(column, config.example_limit);
        let amounts: Vec<f64> = raw.iter().filter_map(|s| parse_currency_amount(s)).collect();

        if amounts.is_empty() {
            debug!(column = column.name(), "No parseable currency amounts");
            return AnalyzerResult::Failed(AnalyzerFailure {
                error: "No valid currency values".to_string(),
                symbol: Some(symbol),
                example_values: Some(examples),
                missing_values: Some(missing_values),
            });
        }

        let sorted = stats::sorted(&amounts);
        // Non-empty, so every order statistic exists.
        let first = sorted[0];
        let last = sorted[sorted.len() - 1];
        let quantile = |q: f64| stats::quantile_sorted(&sorted, q).unwrap_or(first);

        AnalyzerResult::Currency(CurrencyAnalysis {
            symbol,
            count: amounts.len(),
            total_sum: amounts.iter().sum(),
            mean: stats::mean(&amounts).unwrap_or(first),
            median: quantile(0.5),
            min: first,
            max: last,
            std_dev: stats::std_dev(&amounts),
            q1: quantile(0.25),
            q3: quantile(0.75),
            unique_values: stats::distinct_count(&amounts),
            missing_values,
            example_values: examples,
        })
    }
}

/// Most common leading non-numeric character; ties go to the smallest.
fn dominant_symbol(values: &[String]) -> String {
    stats::value_counts_by(values.iter().filter_map(|s| leading_symbol(s)), |a, b| a.cmp(b))
        .first()
        .map(|(symbol, _)| symbol.to_string())
        .unwrap_or_default()
}

impl ToReportValue for CurrencyAnalysis {
    fn to_report_value(&self) -> ReportValue {
        ReportMap::new()
            .with("symbol", self.symbol.as_str())
            .with("count", self.count)
            .with("total_sum", self.total_sum)
            .with("mean", self.mean)
            .with("median", self.median)
            .with("min", self.min)
            .with("max", self.max)
            .with("std_dev", self.std_dev)
            .with("q1", self.q1)
            .with("q3", self.q3)
            .with("unique_values", self.unique_values)
            .with("missing_values", self.missing_values)
            .with("example_values", self.example_values.clone())
            .into()
    }
}
