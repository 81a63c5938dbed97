//! Group-wise aggregation by one column.
//!
//! Integer and float grouping columns are binned: first into equal-population
//! quantile buckets, and when those cannot be formed, into equal-width bins.
//! Any other grouping column groups rows by exact (rendered) value. Each bucket
//! reports its row count and mean/count/min/max for every other number column.
//!
//! Failures are returned as [`GroupingError`] so the caller can embed them in
//! the report instead of aborting.

use crate::config::AnalysisConfig;
use crate::dataset::{Column, Dataset};
use crate::error::GroupingError;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Decimal places shown in bin labels when they are enough to tell edges apart.
const LABEL_PRECISION: u32 = 3;

/// Past this many decimals, labels print the edges unrounded.
const MAX_LABEL_PRECISION: u32 = 15;

/// A right-closed numeric interval `(lower, upper]`.
///
/// `precision` is the number of decimals shown in the label; `None` prints
/// the edges as is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinInterval {
    pub lower: f64,
    pub upper: f64,
    pub precision: Option<u32>,
}

impl BinInterval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            precision: Some(LABEL_PRECISION),
        }
    }

    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        self.precision = precision;
        self
    }
}

impl fmt::Display for BinInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}]",
            format_edge(self.lower, self.precision),
            format_edge(self.upper, self.precision)
        )
    }
}

fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}

fn format_edge(value: f64, precision: Option<u32>) -> String {
    let shown = precision.map_or(value, |p| round_to(value, p));
    if shown.fract() == 0.0 && shown.abs() < 1e16 {
        format!("{shown:.1}")
    } else {
        shown.to_string()
    }
}

/// Smallest precision from [`LABEL_PRECISION`] up at which no two edges round
/// to the same value.
fn label_precision(edges: &[f64]) -> Option<u32> {
    (LABEL_PRECISION..=MAX_LABEL_PRECISION).find(|&p| {
        edges
            .windows(2)
            .all(|pair| round_to(pair[0], p) != round_to(pair[1], p))
    })
}

/// How rows were partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinningStrategy {
    Quantile,
    EqualWidth,
    Categorical,
}

/// Aggregates of one number column inside one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupColumnStats {
    pub mean: Option<f64>,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GroupColumnStats {
    fn from_values(values: &[f64]) -> Self {
        Self {
            mean: stats::mean(values),
            count: values.len(),
            min: stats::min(values),
            max: stats::max(values),
        }
    }
}

impl ToReportValue for GroupColumnStats {
    fn to_report_value(&self) -> ReportValue {
        ReportMap::new()
            .with("mean", self.mean)
            .with("count", self.count)
            .with("min", self.min)
            .with("max", self.max)
            .into()
    }
}

/// One group of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBucket {
    pub label: String,
    pub bin: Option<BinInterval>,
    pub row_count: usize,
    pub numerical_stats: Vec<(String, GroupColumnStats)>,
}

impl ToReportValue for GroupBucket {
    fn to_report_value(&self) -> ReportValue {
        let stats: ReportMap = self
            .numerical_stats
            .iter()
            .map(|(name, stats)| (name.clone(), stats.to_report_value()))
            .collect();

        let mut node = ReportMap::new();
        if let Some(bin) = self.bin {
            node.insert("bin", bin);
        }
        node.with("row_count", self.row_count)
            .with("numerical_stats", stats)
            .into()
    }
}

/// Result of grouping a dataset by one column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAnalysis {
    pub column: String,
    pub strategy: BinningStrategy,
    pub buckets: Vec<GroupBucket>,
}

impl ToReportValue for GroupAnalysis {
    fn to_report_value(&self) -> ReportValue {
        self.buckets
            .iter()
            .map(|bucket| (bucket.label.clone(), bucket.to_report_value()))
            .collect::<ReportMap>()
            .into()
    }
}

/// Group `dataset` by `column`.
///
/// Returns `None` when the column does not exist.
pub fn group_analysis(
    dataset: &Dataset,
    column: &str,
    config: &AnalysisConfig,
) -> Option<Result<GroupAnalysis, GroupingError>> {
    let group_column = dataset.column(column)?;
    Some(group_by_column(dataset, group_column, config))
}

fn group_by_column(
    dataset: &Dataset,
    group_column: &Column,
    config: &AnalysisConfig,
) -> Result<GroupAnalysis, GroupingError> {
    if group_column.non_missing().next().is_none() {
        return Err(GroupingError::NoValues(group_column.name().to_string()));
    }

    let (strategy, partitions) = if group_column.storage().is_number() {
        bin_numeric(group_column, config)?
    } else {
        (BinningStrategy::Categorical, partition_by_value(group_column))
    };

    let stat_columns: Vec<&Column> = dataset
        .columns()
        .iter()
        .filter(|c| c.name() != group_column.name() && c.storage().is_number())
        .collect();

    let buckets = partitions
        .into_iter()
        .filter(|p| !p.rows.is_empty())
        .map(|partition| {
            let numerical_stats = stat_columns
                .iter()
                .map(|col| {
                    let values: Vec<f64> = partition
                        .rows
                        .iter()
                        .filter_map(|&row| col.cells()[row].to_number())
                        .collect();
                    (col.name().to_string(), GroupColumnStats::from_values(&values))
                })
                .collect();
            GroupBucket {
                label: partition.label,
                bin: partition.bin,
                row_count: partition.rows.len(),
                numerical_stats,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        column = group_column.name(),
        ?strategy,
        buckets = buckets.len(),
        "Group analysis complete"
    );

    Ok(GroupAnalysis {
        column: group_column.name().to_string(),
        strategy,
        buckets,
    })
}

struct Partition {
    label: String,
    bin: Option<BinInterval>,
    rows: Vec<usize>,
}

fn partition_by_value(column: &Column) -> Vec<Partition> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (row, cell) in column.cells().iter().enumerate() {
        if let Some(key) = cell.render() {
            groups.entry(key).or_default().push(row);
        }
    }
    groups
        .into_iter()
        .map(|(label, rows)| Partition {
            label,
            bin: None,
            rows,
        })
        .collect()
}

fn bin_numeric(
    column: &Column,
    config: &AnalysisConfig,
) -> Result<(BinningStrategy, Vec<Partition>), GroupingError> {
    let values = column.numbers();

    let (strategy, edges, include_lowest) = match quantile_edges(&values, config.quantile_buckets) {
        Ok(edges) => (BinningStrategy::Quantile, edges, true),
        Err(reason) => {
            warn!(
                column = column.name(),
                %reason,
                bins = config.fallback_bins,
                "Quantile binning failed, falling back to equal-width bins"
            );
            let edges = equal_width_edges(&values, config.fallback_bins)?;
            (BinningStrategy::EqualWidth, edges, false)
        }
    };

    let precision = label_precision(&edges);
    let intervals: Vec<BinInterval> = edges
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let lower = match precision {
                Some(p) if i == 0 && include_lowest => pair[0] - 10f64.powi(-(p as i32)),
                _ => pair[0],
            };
            BinInterval::new(lower, pair[1]).with_precision(precision)
        })
        .collect();

    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); intervals.len()];
    for (row, cell) in column.cells().iter().enumerate() {
        let Some(value) = cell.to_number() else {
            continue;
        };
        if let Some(bucket) = assign_bucket(&edges, value, include_lowest) {
            rows[bucket].push(row);
        }
    }

    let partitions = intervals
        .into_iter()
        .zip(rows)
        .map(|(bin, rows)| Partition {
            label: bin.to_string(),
            bin: Some(bin),
            rows,
        })
        .collect();

    Ok((strategy, partitions))
}

/// Quantile edges at `i / buckets` with duplicates dropped.
fn quantile_edges(values: &[f64], buckets: usize) -> Result<Vec<f64>, GroupingError> {
    let distinct = stats::distinct_count(values);
    if distinct < buckets {
        return Err(GroupingError::InsufficientDistinct { distinct, buckets });
    }

    let sorted = stats::sorted(values);
    let mut edges: Vec<f64> = (0..=buckets)
        .filter_map(|i| stats::quantile_sorted(&sorted, i as f64 / buckets as f64))
        .collect();
    edges.dedup();

    validate_edges(&edges)?;
    Ok(edges)
}

/// `bins` equal-width edges spanning the data, first edge nudged below the minimum.
fn equal_width_edges(values: &[f64], bins: usize) -> Result<Vec<f64>, GroupingError> {
    let (Some(mut lo), Some(mut hi)) = (stats::min(values), stats::max(values)) else {
        return Err(GroupingError::InvalidEdges("no numeric values".to_string()));
    };
    if !lo.is_finite() || !hi.is_finite() {
        return Err(GroupingError::InvalidEdges(
            "range contains infinite values".to_string(),
        ));
    }

    let constant = lo == hi;
    if constant {
        let pad = if lo == 0.0 { 0.001 } else { 0.001 * lo.abs() };
        lo -= pad;
        hi += pad;
    }

    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + step * i as f64).collect();
    edges[bins] = hi;
    if !constant {
        edges[0] -= (hi - lo) * 0.001;
    }

    validate_edges(&edges)?;
    Ok(edges)
}

fn validate_edges(edges: &[f64]) -> Result<(), GroupingError> {
    if edges.len() < 2 {
        return Err(GroupingError::InvalidEdges(format!(
            "need at least 2 edges, got {}",
            edges.len()
        )));
    }
    if let Some(edge) = edges.iter().find(|e| !e.is_finite()) {
        return Err(GroupingError::InvalidEdges(format!("non-finite edge {edge}")));
    }
    Ok(())
}

/// Index of the right-closed bucket holding `value`.
fn assign_bucket(edges: &[f64], value: f64, include_lowest: bool) -> Option<usize> {
    let first = *edges.first()?;
    if include_lowest && value == first {
        return Some(0);
    }
    edges
        .windows(2)
        .position(|pair| value > pair[0] && value <= pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn int_column(name: &str, values: &[i64]) -> Column {
        Column::new(name, values.iter().map(|v| Cell::Integer(*v)).collect())
    }

    fn float_column(name: &str, values: &[f64]) -> Column {
        Column::new(name, values.iter().map(|v| Cell::Float(*v)).collect())
    }

    // ==================== BinInterval tests ====================

    #[test]
    fn test_interval_labels() {
        assert_eq!(BinInterval::new(0.999, 2.75).to_string(), "(0.999, 2.75]");
        assert_eq!(BinInterval::new(10.0, 20.0).to_string(), "(10.0, 20.0]");
        assert_eq!(BinInterval::new(0.12345, 1.0).to_string(), "(0.123, 1.0]");
        assert_eq!(
            BinInterval::new(0.12345, 1.0).with_precision(None).to_string(),
            "(0.12345, 1.0]"
        );
    }

    #[test]
    fn test_label_precision_grows_until_edges_differ() {
        assert_eq!(label_precision(&[1.0, 2.75, 4.5]), Some(3));
        assert_eq!(label_precision(&[1.00001, 1.0000275, 1.00008]), Some(5));
        assert_eq!(label_precision(&[1.0, 1.0 + f64::EPSILON]), None);
    }

    // ==================== edge tests ====================

    #[test]
    fn test_quantile_edges() {
        let values: Vec<f64> = (1..=8).map(f64::from).collect();
        let edges = quantile_edges(&values, 4).unwrap();
        assert_eq!(edges, vec![1.0, 2.75, 4.5, 6.25, 8.0]);
    }

    #[test]
    fn test_quantile_edges_too_few_distinct() {
        let err = quantile_edges(&[1.0, 1.0, 2.0, 2.0], 4).unwrap_err();
        assert_eq!(
            err,
            GroupingError::InsufficientDistinct {
                distinct: 2,
                buckets: 4
            }
        );
    }

    #[test]
    fn test_equal_width_edges() {
        let edges = equal_width_edges(&[0.0, 10.0], 5).unwrap();
        assert_eq!(edges.len(), 6);
        assert!((edges[0] - (-0.01)).abs() < 1e-12);
        assert_eq!(edges[5], 10.0);
        assert!((edges[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_width_constant_column() {
        let edges = equal_width_edges(&[5.0, 5.0], 5).unwrap();
        assert!((edges[0] - 4.995).abs() < 1e-12);
        assert!((edges[5] - 5.005).abs() < 1e-12);
    }

    #[test]
    fn test_equal_width_rejects_infinity() {
        let err = equal_width_edges(&[1.0, f64::INFINITY], 5).unwrap_err();
        assert!(matches!(err, GroupingError::InvalidEdges(_)));
    }

    #[test]
    fn test_assign_bucket() {
        let edges = [1.0, 2.0, 3.0];
        assert_eq!(assign_bucket(&edges, 1.0, true), Some(0));
        assert_eq!(assign_bucket(&edges, 1.0, false), None);
        assert_eq!(assign_bucket(&edges, 2.0, true), Some(0));
        assert_eq!(assign_bucket(&edges, 2.5, true), Some(1));
        assert_eq!(assign_bucket(&edges, 3.5, true), None);
    }

    // ==================== group_analysis tests ====================

    #[test]
    fn test_missing_column_is_noop() {
        let dataset = Dataset::new(vec![int_column("a", &[1, 2])]).unwrap();
        assert!(group_analysis(&dataset, "nope", &AnalysisConfig::default()).is_none());
    }

    #[test]
    fn test_categorical_grouping() {
        let dataset = Dataset::new(vec![
            Column::from_texts(
                "department",
                [Some("IT"), Some("HR"), Some("IT"), None, Some("HR")],
            ),
            int_column("salary", &[100, 50, 300, 999, 70]),
        ])
        .unwrap();

        let analysis = group_analysis(&dataset, "department", &AnalysisConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(analysis.strategy, BinningStrategy::Categorical);
        let labels: Vec<&str> = analysis.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["HR", "IT"]);

        let it = &analysis.buckets[1];
        assert_eq!(it.row_count, 2);
        let (name, stats) = &it.numerical_stats[0];
        assert_eq!(name, "salary");
        assert_eq!(stats.mean, Some(200.0));
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, Some(100.0));
        assert_eq!(stats.max, Some(300.0));
    }

    #[test]
    fn test_numeric_quantile_grouping() {
        let dataset = Dataset::new(vec![
            int_column("age", &[1, 2, 3, 4, 5, 6, 7, 8]),
            float_column("score", &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0]),
        ])
        .unwrap();

        let analysis = group_analysis(&dataset, "age", &AnalysisConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(analysis.strategy, BinningStrategy::Quantile);
        assert_eq!(analysis.buckets.len(), 4);
        assert_eq!(analysis.buckets[0].label, "(0.999, 2.75]");
        assert_eq!(
            analysis.buckets.iter().map(|b| b.row_count).sum::<usize>(),
            8
        );
        assert_eq!(analysis.buckets[0].numerical_stats[0].1.mean, Some(15.0));
    }

    #[test]
    fn test_close_quantile_edges_keep_distinct_labels() {
        let values: Vec<f64> = (1..=8).map(|i| 1.0 + f64::from(i) * 1e-5).collect();
        let dataset = Dataset::new(vec![
            float_column("ratio", &values),
            int_column("n", &[1, 2, 3, 4, 5, 6, 7, 8]),
        ])
        .unwrap();

        let analysis = group_analysis(&dataset, "ratio", &AnalysisConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(analysis.strategy, BinningStrategy::Quantile);
        assert_eq!(analysis.buckets.len(), 4);

        let labels: std::collections::HashSet<&str> =
            analysis.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels.len(), 4);

        let json = serde_json::to_string(&analysis.to_report_value().normalize()).unwrap();
        let decoded: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.len(), 4);
    }

    #[test]
    fn test_two_distinct_values_fall_back_to_equal_width() {
        let dataset = Dataset::new(vec![
            int_column("flag", &[0, 1, 0, 1, 1, 0]),
            int_column("amount", &[5, 10, 15, 20, 25, 30]),
        ])
        .unwrap();

        let analysis = group_analysis(&dataset, "flag", &AnalysisConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(analysis.strategy, BinningStrategy::EqualWidth);
        assert_eq!(analysis.buckets.len(), 2);
        assert_eq!(analysis.buckets[0].label, "(-0.001, 0.2]");
        assert_eq!(analysis.buckets[1].label, "(0.8, 1.0]");
        assert_eq!(analysis.buckets[0].row_count, 3);
    }

    #[test]
    fn test_all_missing_group_column_errors() {
        let dataset = Dataset::new(vec![
            Column::with_storage("g", crate::dataset::StorageType::Float, vec![Cell::Missing]),
            int_column("v", &[1]),
        ])
        .unwrap();

        let result = group_analysis(&dataset, "g", &AnalysisConfig::default()).unwrap();
        assert_eq!(result.unwrap_err(), GroupingError::NoValues("g".to_string()));
    }

    #[test]
    fn test_group_report_shape() {
        let dataset = Dataset::new(vec![
            Column::from_texts("team", [Some("a"), Some("b")]),
            int_column("points", &[3, 4]),
        ])
        .unwrap();

        let value = group_analysis(&dataset, "team", &AnalysisConfig::default())
            .unwrap()
            .unwrap()
            .to_report_value();

        assert_eq!(value.keys(), vec!["a", "b"]);
        assert_eq!(
            value
                .pointer(&["a", "numerical_stats", "points", "mean"])
                .and_then(ReportValue::as_f64),
            Some(3.0)
        );
        assert_eq!(
            value.pointer(&["b", "row_count"]).and_then(ReportValue::as_i64),
            Some(1)
        );
    }
}
