//! Semantic analyzers and the registry that dispatches to them.
//!
//! Every [`SemanticType`] either maps to exactly one [`ColumnAnalyzer`] or is
//! explicitly passed through without a statistics block. The mapping is an
//! exhaustive `match`, so adding a semantic type forces a decision here.
//!
//! Analyzers never fail: empty input yields [`AnalyzerResult::Empty`] or an
//! [`AnalyzerResult::Failed`] record, and unparseable values are dropped and
//! reflected in the count fields.

mod boolean;
mod currency;
mod date;
mod id;
mod numeric;
mod string;

pub use boolean::{BooleanAnalysis, BooleanAnalyzer};
pub use currency::{CurrencyAnalysis, CurrencyAnalyzer};
pub use date::{DateAnalysis, DateAnalyzer};
pub use id::{IdAnalysis, IdAnalyzer};
pub use numeric::{NumericAnalysis, NumericAnalyzer};
pub use string::{StringAnalysis, StringAnalyzer};

use crate::config::AnalysisConfig;
use crate::dataset::Column;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::types::SemanticType;

/// A statistics producer for one semantic type.
pub trait ColumnAnalyzer: Send + Sync {
    /// The semantic type this analyzer handles.
    fn semantic_type(&self) -> SemanticType;

    /// Analyze a column, missing values included.
    fn analyze(&self, column: &Column, config: &AnalysisConfig) -> AnalyzerResult;
}

/// Look up the analyzer for a semantic type.
///
/// Returns `None` for pass-through types, which get no statistics block.
pub fn analyzer_for(semantic: SemanticType) -> Option<&'static dyn ColumnAnalyzer> {
    match semantic {
        SemanticType::Boolean => Some(&BooleanAnalyzer),
        SemanticType::Currency => Some(&CurrencyAnalyzer),
        SemanticType::Numeric => Some(&NumericAnalyzer),
        SemanticType::String => Some(&StringAnalyzer),
        SemanticType::Id => Some(&IdAnalyzer),
        SemanticType::Date => Some(&DateAnalyzer),
        SemanticType::Unknown
        | SemanticType::Null
        | SemanticType::FlightNumber
        | SemanticType::Email
        | SemanticType::Url
        | SemanticType::PhoneNumber => None,
    }
}

/// Dispatch a column to the analyzer for its semantic type.
pub fn analyze_column(
    column: &Column,
    semantic: SemanticType,
    config: &AnalysisConfig,
) -> Option<AnalyzerResult> {
    analyzer_for(semantic).map(|analyzer| analyzer.analyze(column, config))
}

/// Output of one analyzer run.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerResult {
    /// Nothing usable remained after filtering.
    Empty,
    /// The analyzer could not produce statistics.
    Failed(AnalyzerFailure),
    Boolean(BooleanAnalysis),
    Currency(CurrencyAnalysis),
    Numeric(NumericAnalysis),
    String(StringAnalysis),
    Id(IdAnalysis),
    Date(DateAnalysis),
}

impl AnalyzerResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, AnalyzerResult::Empty)
    }
}

impl ToReportValue for AnalyzerResult {
    fn to_report_value(&self) -> ReportValue {
        match self {
            AnalyzerResult::Empty => ReportMap::new().into(),
            AnalyzerResult::Failed(failure) => failure.to_report_value(),
            AnalyzerResult::Boolean(analysis) => analysis.to_report_value(),
            AnalyzerResult::Currency(analysis) => analysis.to_report_value(),
            AnalyzerResult::Numeric(analysis) => analysis.to_report_value(),
            AnalyzerResult::String(analysis) => analysis.to_report_value(),
            AnalyzerResult::Id(analysis) => analysis.to_report_value(),
            AnalyzerResult::Date(analysis) => analysis.to_report_value(),
        }
    }
}

/// Error record emitted in place of statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyzerFailure {
    pub error: String,
    pub symbol: Option<String>,
    pub example_values: Option<Vec<String>>,
    pub missing_values: Option<usize>,
}

impl AnalyzerFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

impl ToReportValue for AnalyzerFailure {
    fn to_report_value(&self) -> ReportValue {
        let mut node = ReportMap::new().with("error", self.error.as_str());
        if let Some(symbol) = &self.symbol {
            node.insert("symbol", symbol.as_str());
        }
        if let Some(examples) = &self.example_values {
            node.insert("example_values", examples.clone());
        }
        if let Some(missing) = self.missing_values {
            node.insert("missing_values", missing);
        }
        node.into()
    }
}

/// First `limit` rendered non-missing values, in row order.
pub(crate) fn example_values(column: &Column, limit: usize) -> Vec<String> {
    column.rendered().into_iter().take(limit).collect()
}
