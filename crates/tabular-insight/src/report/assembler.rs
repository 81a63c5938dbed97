use super::value::{ReportMap, ReportValue, ToReportValue};
use crate::analyzers::{AnalyzerResult, analyze_column};
use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, StorageType};
use crate::error::{GroupingError, Result};
use crate::grouping::{GroupAnalysis, group_analysis};
use crate::inference::SemanticClassifier;
use crate::profiler::{CategoricalSummary, ColumnProfile, DataProfiler, DataQuality, NumericSummary};
use crate::types::SemanticType;
use chrono::{NaiveDateTime, Utc};
use static_assertions::assert_impl_all;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Shape and storage of the analyzed dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<String>,
    pub data_types: Vec<(String, StorageType)>,
    pub memory_bytes: usize,
}

impl ReportMetadata {
    fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            total_rows: dataset.height(),
            total_columns: dataset.width(),
            columns: dataset.column_names().into_iter().map(String::from).collect(),
            data_types: dataset
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.storage()))
                .collect(),
            memory_bytes: dataset.estimated_bytes(),
        }
    }

    /// Memory estimate rendered as megabytes with two decimals.
    pub fn memory_usage(&self) -> String {
        format!("{:.2} MB", self.memory_bytes as f64 / BYTES_PER_MB)
    }
}

impl ToReportValue for ReportMetadata {
    fn to_report_value(&self) -> ReportValue {
        let data_types: ReportMap = self
            .data_types
            .iter()
            .map(|(name, storage)| (name.clone(), storage.label()))
            .collect();
        ReportMap::new()
            .with("total_rows", self.total_rows)
            .with("total_columns", self.total_columns)
            .with("columns", self.columns.clone())
            .with("data_types", data_types)
            .with("memory_usage", self.memory_usage())
            .into()
    }
}

/// Semantic type and specialized statistics of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReport {
    pub name: String,
    pub semantic_type: SemanticType,
    /// `None` for semantic types without an analyzer.
    pub analysis: Option<AnalyzerResult>,
}

impl ToReportValue for ColumnReport {
    fn to_report_value(&self) -> ReportValue {
        ReportMap::new()
            .with("name", self.name.as_str())
            .with("type", self.semantic_type.as_str())
            .with(
                "analysis",
                self.analysis
                    .as_ref()
                    .map(ToReportValue::to_report_value)
                    .unwrap_or(ReportValue::Null),
            )
            .into()
    }
}

/// Complete result of one analysis call.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub analysis_id: String,
    pub analysis_timestamp: NaiveDateTime,
    pub metadata: ReportMetadata,
    pub duplicate_analysis: Vec<(String, ColumnProfile)>,
    pub numerical_analysis: Vec<(String, NumericSummary)>,
    pub categorical_analysis: Vec<(String, CategoricalSummary)>,
    pub data_quality: DataQuality,
    pub columns: Vec<ColumnReport>,
    /// Present when a group-by column was configured and exists.
    pub group_analysis: Option<std::result::Result<GroupAnalysis, GroupingError>>,
}

// Reports are built on one thread and may be handed to another.
assert_impl_all!(Report: Send, Sync);

impl Report {
    /// Column report by name.
    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Serialize into the normalized JSON-safe tree.
    pub fn into_value(self) -> ReportValue {
        self.to_report_value().normalize()
    }
}

fn section<T: ToReportValue>(entries: &[(String, T)]) -> ReportMap {
    entries
        .iter()
        .map(|(name, entry)| (name.clone(), entry.to_report_value()))
        .collect()
}

impl ToReportValue for Report {
    fn to_report_value(&self) -> ReportValue {
        let columns: Vec<ReportValue> = self.columns.iter().map(ToReportValue::to_report_value).collect();

        let mut node = ReportMap::new()
            .with("analysis_id", self.analysis_id.as_str())
            .with("analysis_timestamp", self.analysis_timestamp)
            .with("metadata", self.metadata.to_report_value())
            .with("duplicate_analysis", section(&self.duplicate_analysis))
            .with("numerical_analysis", section(&self.numerical_analysis))
            .with("categorical_analysis", section(&self.categorical_analysis))
            .with("data_quality", self.data_quality.to_report_value())
            .with("columns", columns);

        match &self.group_analysis {
            Some(Ok(groups)) => node.insert("group_analysis", groups.to_report_value()),
            Some(Err(e)) => node.insert(
                "group_analysis",
                ReportMap::new().with("error", format!("Group analysis failed: {e}")),
            ),
            None => {}
        }
        node.into()
    }
}

/// Run every profiler, classifier and analyzer over `dataset`.
///
/// Only an invalid configuration fails the call. Column and grouping
/// problems are recorded inside the report.
pub fn build_report(dataset: &Dataset, config: &AnalysisConfig) -> Result<Report> {
    config.validate()?;
    let start = Instant::now();
    info!(
        rows = dataset.height(),
        columns = dataset.width(),
        "Starting dataset analysis"
    );

    let classifier = SemanticClassifier::from_config(config);

    let mut duplicate_analysis = Vec::with_capacity(dataset.width());
    let mut numerical_analysis = Vec::new();
    let mut categorical_analysis = Vec::new();
    let mut columns = Vec::with_capacity(dataset.width());

    for column in dataset.columns() {
        let name = column.name().to_string();

        duplicate_analysis.push((name.clone(), DataProfiler::profile_column(column, config)));
        if let Some(summary) = DataProfiler::numeric_summary(column) {
            numerical_analysis.push((name.clone(), summary));
        }
        if let Some(summary) = DataProfiler::categorical_summary(column) {
            categorical_analysis.push((name.clone(), summary));
        }

        let semantic_type = classifier.classify(column);
        let analysis = analyze_column(column, semantic_type, config);
        debug!(
            column = %name,
            semantic = %semantic_type,
            analyzed = analysis.is_some(),
            "Column analyzed"
        );
        columns.push(ColumnReport {
            name,
            semantic_type,
            analysis,
        });
    }

    let groups = config.group_by_column.as_deref().and_then(|group_column| {
        let outcome = group_analysis(dataset, group_column, config);
        match &outcome {
            None => debug!(column = group_column, "Group-by column not found, skipping"),
            Some(Err(e)) => warn!(column = group_column, error = %e, "Group analysis failed"),
            Some(Ok(_)) => {}
        }
        outcome
    });

    let report = Report {
        analysis_id: Uuid::new_v4().to_string(),
        analysis_timestamp: Utc::now().naive_utc(),
        metadata: ReportMetadata::from_dataset(dataset),
        duplicate_analysis,
        numerical_analysis,
        categorical_analysis,
        data_quality: DataProfiler::data_quality(dataset),
        columns,
        group_analysis: groups,
    };

    info!(
        analysis_id = %report.analysis_id,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Dataset analysis complete"
    );
    Ok(report)
}

/// Analyze `dataset` and return the normalized report tree.
pub fn analyze_dataset(dataset: &Dataset, config: &AnalysisConfig) -> Result<ReportValue> {
    Ok(build_report(dataset, config)?.into_value())
}
