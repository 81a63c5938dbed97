//! Semantic-independent profiling of a dataset.
//!
//! This module provides:
//! - Per-column duplicate and frequency profiles ([`ColumnProfile`])
//! - The generic numeric summary for numeric storage ([`NumericSummary`])
//! - Frequency summaries for text storage ([`CategoricalSummary`])
//! - Dataset-wide quality counts ([`DataQuality`])

mod duplicates;
mod quality;
mod summary;

pub use duplicates::ColumnProfile;
pub use quality::DataQuality;
pub use summary::{CategoricalSummary, NumericSummary};

use crate::config::AnalysisConfig;
use crate::dataset::{Cell, Column, Dataset, StorageType};
use std::collections::HashMap;
use tracing::debug;

/// Profiler for duplicate, frequency and quality statistics.
pub struct DataProfiler;

impl DataProfiler {
    /// Duplicate profile of one column.
    pub fn profile_column(column: &Column, config: &AnalysisConfig) -> ColumnProfile {
        let profile = ColumnProfile::from_column(column, config);
        debug!(
            column = column.name(),
            unique = profile.unique_count,
            duplicates = profile.duplicate_count,
            "Profiled column"
        );
        profile
    }

    /// Generic numeric summary, for numeric storage only.
    pub fn numeric_summary(column: &Column) -> Option<NumericSummary> {
        column
            .storage()
            .is_numeric()
            .then(|| NumericSummary::from_column(column))
    }

    /// Frequency summary, for text storage only.
    pub fn categorical_summary(column: &Column) -> Option<CategoricalSummary> {
        (column.storage() == StorageType::Text).then(|| CategoricalSummary::from_column(column))
    }

    /// Dataset-wide missing and duplicate counts.
    pub fn data_quality(dataset: &Dataset) -> DataQuality {
        DataQuality::from_dataset(dataset)
    }
}

/// Non-missing value counts, most frequent first, ties in natural value order.
///
/// Values are identified by their rendered text.
pub(crate) fn value_counts(column: &Column) -> Vec<(&Cell, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(&Cell, usize)> = Vec::new();

    for cell in column.non_missing() {
        let Some(key) = cell.render() else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((cell, 1));
            }
        }
    }

    counts.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.compare(b)));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_counts_order() {
        let column = Column::new(
            "n",
            vec![
                Cell::Integer(10),
                Cell::Integer(9),
                Cell::Integer(10),
                Cell::Missing,
                Cell::Integer(9),
                Cell::Integer(1),
            ],
        );
        let counts = value_counts(&column);
        assert_eq!(
            counts,
            vec![
                (&Cell::Integer(9), 2),
                (&Cell::Integer(10), 2),
                (&Cell::Integer(1), 1)
            ]
        );
    }

    #[test]
    fn test_summaries_follow_storage() {
        let numbers = Column::new("n", vec![Cell::Integer(1)]);
        let flags = Column::new("b", vec![Cell::Boolean(true)]);
        let text = Column::from_texts("t", [Some("x")]);

        assert!(DataProfiler::numeric_summary(&numbers).is_some());
        assert!(DataProfiler::numeric_summary(&flags).is_some());
        assert!(DataProfiler::numeric_summary(&text).is_none());

        assert!(DataProfiler::categorical_summary(&text).is_some());
        assert!(DataProfiler::categorical_summary(&numbers).is_none());
    }
}
