//! Semantic type inference and statistical profiling for tabular datasets.
//!
//! # Overview
//!
//! This library turns an in-memory table of loosely typed values into a
//! JSON-ready analytical report:
//!
//! - **Duplicate profiling**: per-column duplicate, uniqueness and frequency counts
//! - **Semantic typing**: sample voting over per-value heuristics assigns each
//!   column a [`SemanticType`] (currency, date, id, boolean, ...)
//! - **Semantic analyzers**: type-specific statistics such as outliers,
//!   currency symbols, UUID/sequential id detection and date gaps
//! - **Group aggregation**: quantile (or equal-width) binning of a numeric
//!   column, or exact-value grouping, with per-group numeric statistics
//! - **Safe serialization**: one final normalization pass maps NaN and
//!   infinities to `null` and timestamps to ISO-8601 text
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabular_insight::{AnalysisConfig, analyze_dataset, load_dataset};
//!
//! let dataset = load_dataset("employees.csv")?;
//! let config = AnalysisConfig::builder()
//!     .group_by_column("department")
//!     .build()?;
//!
//! let report = analyze_dataset(&dataset, &config)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! Building a dataset by hand:
//!
//! ```rust,ignore
//! use tabular_insight::{Cell, Column, Dataset};
//!
//! let dataset = Dataset::new(vec![
//!     Column::new("id", vec![Cell::Integer(1), Cell::Integer(2)]),
//!     Column::from_texts("price", [Some("$10.00"), None]),
//! ])?;
//! ```
//!
//! Analysis is synchronous and stateless. Independent datasets can be
//! analyzed on separate threads without coordination.

pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod grouping;
pub mod inference;
pub mod loader;
pub mod profiler;
pub mod report;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analyzers::{AnalyzerFailure, AnalyzerResult, ColumnAnalyzer, analyze_column, analyzer_for};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use dataset::{Cell, Column, Dataset, StorageType};
pub use error::{AnalysisError, GroupingError, Result as AnalysisResult, ResultExt};
pub use grouping::{BinInterval, BinningStrategy, GroupAnalysis, GroupBucket, group_analysis};
pub use inference::{SemanticClassifier, classify_value, parse_date};
pub use loader::{load_csv_with_fallbacks, load_dataset, sample_dataset};
pub use profiler::{CategoricalSummary, ColumnProfile, DataProfiler, DataQuality, NumericSummary};
pub use report::{ColumnReport, Report, ReportMap, ReportValue, ToReportValue, analyze_dataset, build_report};
pub use types::SemanticType;
