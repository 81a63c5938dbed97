use super::{AnalyzerFailure, AnalyzerResult, ColumnAnalyzer, example_values};
use crate::config::AnalysisConfig;
use crate::dataset::Column;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats;
use crate::types::SemanticType;
use crate::utils::{is_all_alphabetic, is_all_alphanumeric, is_all_numeric};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static UUID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F\-]{36}$").expect("Invalid regex: uuid"));

static HEX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]+$").expect("Invalid regex: hex"));

/// Share of values that must match a shape for the column to count as that shape.
const SHAPE_MATCH_RATIO: f64 = 0.9;

/// Shape analysis for identifier columns.
pub struct IdAnalyzer;

#[derive(Debug, Clone, PartialEq)]
pub struct IdAnalysis {
    pub count: usize,
    pub unique_count: usize,
    pub uniqueness_ratio: f64,
    pub length_min: usize,
    pub length_max: usize,
    pub length_mean: f64,
    pub is_numeric: bool,
    pub is_alpha: bool,
    pub is_alphanumeric: bool,
    pub common_prefix: Option<String>,
    pub common_suffix: Option<String>,
    pub uuid_like: bool,
    pub hex_like: bool,
    pub sequential: bool,
    pub example_values: Vec<String>,
}

impl ColumnAnalyzer for IdAnalyzer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Id
    }

    fn analyze(&self, column: &Column, config: &AnalysisConfig) -> AnalyzerResult {
        let values = column.rendered();
        if values.is_empty() {
            return AnalyzerResult::Failed(AnalyzerFailure::new("Empty series"));
        }

        let count = values.len();
        let unique_count = values.iter().collect::<HashSet<_>>().len();
        let lengths: Vec<usize> = values.iter().map(|v| v.chars().count()).collect();
        let is_numeric = values.iter().all(|v| is_all_numeric(v));
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();

        AnalyzerResult::Id(IdAnalysis {
            count,
            unique_count,
            uniqueness_ratio: unique_count as f64 / count as f64,
            length_min: lengths.iter().copied().min().unwrap_or_default(),
            length_max: lengths.iter().copied().max().unwrap_or_default(),
            length_mean: lengths.iter().sum::<usize>() as f64 / count as f64,
            is_numeric,
            is_alpha: values.iter().all(|v| is_all_alphabetic(v)),
            is_alphanumeric: values.iter().all(|v| is_all_alphanumeric(v)),
            common_prefix: non_empty(longest_common_prefix(&refs)),
            common_suffix: non_empty(longest_common_suffix(&refs)),
            uuid_like: match_ratio(&values, &UUID_PATTERN) > SHAPE_MATCH_RATIO,
            hex_like: match_ratio(&values, &HEX_PATTERN) > SHAPE_MATCH_RATIO,
            sequential: is_numeric && is_sequential(&values),
            example_values: example_values(column, config.example_limit),
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn match_ratio(values: &[String], pattern: &Regex) -> f64 {
    let matched = values.iter().filter(|v| pattern.is_match(v)).count();
    matched as f64 / values.len() as f64
}

/// Common prefix of the whole set, found by comparing only its smallest and
/// largest members.
fn longest_common_prefix(values: &[&str]) -> String {
    let (Some(lo), Some(hi)) = (values.iter().min(), values.iter().max()) else {
        return String::new();
    };
    lo.chars()
        .zip(hi.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a)
        .collect()
}

fn longest_common_suffix(values: &[&str]) -> String {
    let reversed: Vec<String> = values.iter().map(|v| v.chars().rev().collect()).collect();
    let reversed: Vec<&str> = reversed.iter().map(String::as_str).collect();
    longest_common_prefix(&reversed).chars().rev().collect()
}

/// Sorted distinct values step by exactly one, or their median step is one.
fn is_sequential(values: &[String]) -> bool {
    let mut numbers: Vec<f64> = values.iter().filter_map(|v| v.parse::<f64>().ok()).collect();
    numbers.sort_by(f64::total_cmp);
    numbers.dedup();

    let diffs: Vec<f64> = numbers.windows(2).map(|w| w[1] - w[0]).collect();
    if diffs.is_empty() {
        return false;
    }
    diffs.iter().all(|d| *d == 1.0) || stats::median(&diffs) == Some(1.0)
}

impl ToReportValue for IdAnalysis {
    fn to_report_value(&self) -> ReportValue {
        ReportMap::new()
            .with("count", self.count)
            .with("unique_count", self.unique_count)
            .with("uniqueness_ratio", self.uniqueness_ratio)
            .with("length_min", self.length_min)
            .with("length_max", self.length_max)
            .with("length_mean", self.length_mean)
            .with("is_numeric", self.is_numeric)
            .with("is_alpha", self.is_alpha)
            .with("is_alphanumeric", self.is_alphanumeric)
            .with("common_prefix", self.common_prefix.clone())
            .with("common_suffix", self.common_suffix.clone())
            .with("uuid_like", self.uuid_like)
            .with("hex_like", self.hex_like)
            .with("sequential", self.sequential)
            .with("example_values", self.example_values.clone())
            .into()
    }
}
