//! Error types for dataset analysis.
//!
//! Column-level problems (unparseable values, empty columns) never surface
//! here: analyzers absorb them into their records. These errors cover the
//! dataset-level failures that abort a whole analysis call, plus the
//! recoverable [`GroupingError`] that ends up inside the report.
//!
//! Errors are serializable so a transport layer can forward them as
//! `{ "code", "message" }` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for dataset analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Two columns share the same name.
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// Columns disagree on the number of rows.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Dataset has no columns at all.
    #[error("Dataset has no columns")]
    EmptyDataset,

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigValidationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for transport-level handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::RaggedColumns { .. } => "RAGGED_COLUMNS",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the input itself could not be interpreted as a table.
    pub fn is_unrecoverable_input(&self) -> bool {
        match self {
            Self::DuplicateColumn(_) | Self::RaggedColumns { .. } | Self::EmptyDataset => true,
            Self::WithContext { source, .. } => source.is_unrecoverable_input(),
            _ => false,
        }
    }
}

impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

/// Reasons group aggregation can fail.
///
/// These never abort a report; the assembler turns them into the
/// `group_analysis.error` string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupingError {
    /// The grouping column has no non-missing values.
    #[error("column '{0}' has no non-missing values")]
    NoValues(String),

    /// Bin edges could not be formed.
    #[error("invalid bin edges: {0}")]
    InvalidEdges(String),

    /// Too few distinct values for the requested number of quantile buckets.
    #[error("{distinct} distinct values cannot form {buckets} quantile buckets")]
    InsufficientDistinct { distinct: usize, buckets: usize },
}
