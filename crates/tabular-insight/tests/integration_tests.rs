//! Integration tests for dataset analysis.
//!
//! These tests drive the public API end to end, from CSV fixtures or
//! hand-built datasets to the normalized report tree.

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tabular_insight::{
    AnalysisConfig, AnalyzerResult, BinningStrategy, Cell, Column, Dataset, ReportValue,
    SemanticClassifier, SemanticType, analyze_column, analyze_dataset, build_report, load_dataset,
    sample_dataset,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> Dataset {
    load_dataset(fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn grouped_by(column: &str) -> AnalysisConfig {
    AnalysisConfig::builder()
        .group_by_column(column)
        .build()
        .unwrap()
}

fn column_entry<'a>(report: &'a ReportValue, name: &str) -> &'a ReportValue {
    report
        .get("columns")
        .and_then(ReportValue::as_list)
        .and_then(|columns| {
            columns
                .iter()
                .find(|c| c.get("name").and_then(ReportValue::as_str) == Some(name))
        })
        .unwrap_or_else(|| panic!("column '{name}' missing from report"))
}

fn texts(name: &str, values: &[&str]) -> Column {
    Column::from_texts(name, values.iter().map(|v| Some(*v)))
}

// ============================================================================
// CSV Fixture Tests
// ============================================================================

#[test]
fn test_employees_semantic_types() {
    let dataset = load_fixture("employees.csv");
    let report = build_report(&dataset, &AnalysisConfig::default()).unwrap();

    let types: Vec<(&str, SemanticType)> = report
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.semantic_type))
        .collect();
    assert_eq!(
        types,
        vec![
            ("id", SemanticType::Id),
            ("name", SemanticType::String),
            ("joined", SemanticType::Date),
            ("price", SemanticType::Currency),
            ("active", SemanticType::Boolean),
            ("score", SemanticType::Numeric),
            ("department", SemanticType::String),
        ]
    );
}

#[test]
fn test_employees_report_sections() {
    let dataset = load_fixture("employees.csv");
    let report = analyze_dataset(&dataset, &AnalysisConfig::default()).unwrap();

    assert_eq!(
        report.pointer(&["metadata", "total_rows"]).and_then(ReportValue::as_i64),
        Some(10)
    );
    assert_eq!(
        report
            .pointer(&["metadata", "data_types", "id"])
            .and_then(ReportValue::as_str),
        Some("int64")
    );
    assert_eq!(
        report
            .pointer(&["metadata", "data_types", "price"])
            .and_then(ReportValue::as_str),
        Some("object")
    );

    // Bob appears twice
    assert_eq!(
        report
            .pointer(&["duplicate_analysis", "name", "duplicate_count"])
            .and_then(ReportValue::as_i64),
        Some(1)
    );
    assert_eq!(
        report
            .pointer(&["data_quality", "total_missing_values"])
            .and_then(ReportValue::as_i64),
        Some(2)
    );
    assert_eq!(
        report
            .pointer(&["categorical_analysis", "department", "unique_values"])
            .and_then(ReportValue::as_i64),
        Some(3)
    );

    let price = column_entry(&report, "price");
    assert_eq!(
        price.pointer(&["analysis", "symbol"]).and_then(ReportValue::as_str),
        Some("$")
    );
    assert_eq!(
        price.pointer(&["analysis", "min"]).and_then(ReportValue::as_f64),
        Some(300.0)
    );
    assert_eq!(
        price.pointer(&["analysis", "max"]).and_then(ReportValue::as_f64),
        Some(2100.0)
    );
    assert_eq!(
        price
            .pointer(&["analysis", "unique_values"])
            .and_then(ReportValue::as_i64),
        Some(8)
    );

    let active = column_entry(&report, "active");
    assert_eq!(
        active
            .pointer(&["analysis", "true_count"])
            .and_then(ReportValue::as_i64),
        Some(6)
    );
    assert_eq!(
        active
            .pointer(&["analysis", "false_count"])
            .and_then(ReportValue::as_i64),
        Some(4)
    );

    let joined = column_entry(&report, "joined");
    assert_eq!(
        joined
            .pointer(&["analysis", "min_date"])
            .and_then(ReportValue::as_str),
        Some("2023-01-15T00:00:00")
    );
    assert_eq!(
        joined
            .pointer(&["analysis", "most_common_date"])
            .and_then(ReportValue::as_str),
        Some("2023-02-20T00:00:00")
    );
}

#[test]
fn test_employees_group_by_department() {
    let dataset = load_fixture("employees.csv");
    let report = analyze_dataset(&dataset, &grouped_by("department")).unwrap();

    let groups = report.get("group_analysis").unwrap();
    assert_eq!(groups.keys(), vec!["HR", "IT", "Sales"]);
    assert_eq!(
        groups
            .pointer(&["Sales", "row_count"])
            .and_then(ReportValue::as_i64),
        Some(4)
    );
    assert_eq!(
        groups
            .pointer(&["Sales", "numerical_stats", "score", "mean"])
            .and_then(ReportValue::as_f64),
        Some(84.25)
    );
    assert_eq!(
        groups.pointer(&["Sales", "numerical_stats"]).unwrap().keys(),
        vec!["id", "score"]
    );
}

#[test]
fn test_employees_group_by_numeric_column() {
    let dataset = load_fixture("employees.csv");
    let report = build_report(&dataset, &grouped_by("score")).unwrap();

    let groups = report.group_analysis.unwrap().unwrap();
    assert_eq!(groups.strategy, BinningStrategy::Quantile);
    let total: usize = groups.buckets.iter().map(|b| b.row_count).sum();
    // one score is missing
    assert_eq!(total, 9);
}

#[test]
fn test_sessions_fixture() {
    let dataset = load_fixture("sessions.csv");
    let report = build_report(&dataset, &grouped_by("tier")).unwrap();

    let session_id = report.column("session_id").unwrap();
    assert_eq!(session_id.semantic_type, SemanticType::Id);
    match &session_id.analysis {
        Some(AnalyzerResult::Id(analysis)) => {
            assert!(analysis.uuid_like);
            assert!(!analysis.sequential);
            assert_eq!(analysis.uniqueness_ratio, 1.0);
        }
        other => panic!("expected id analysis, got {other:?}"),
    }

    let email = report.column("user_email").unwrap();
    assert_eq!(email.semantic_type, SemanticType::Email);
    assert_eq!(email.analysis, None);

    let duration = report.column("duration").unwrap();
    assert_eq!(duration.semantic_type, SemanticType::Numeric);
    match &duration.analysis {
        Some(AnalyzerResult::Numeric(analysis)) => {
            assert_eq!(analysis.outlier_count, 1);
            assert_eq!(analysis.outlier_examples, vec![400.0]);
        }
        other => panic!("expected numeric analysis, got {other:?}"),
    }

    // two distinct tiers cannot form four quantile buckets
    let groups = report.group_analysis.unwrap().unwrap();
    assert_eq!(groups.strategy, BinningStrategy::EqualWidth);
    let counts: Vec<(&str, usize)> = groups
        .buckets
        .iter()
        .map(|b| (b.label.as_str(), b.row_count))
        .collect();
    assert_eq!(counts, vec![("(0.999, 1.2]", 5), ("(1.8, 2.0]", 3)]);
}

#[test]
fn test_sample_dataset_report() {
    let dataset = sample_dataset().unwrap();
    let report = analyze_dataset(&dataset, &grouped_by("department")).unwrap();

    assert_eq!(
        report
            .pointer(&["data_quality", "complete_duplicates_count"])
            .and_then(ReportValue::as_i64),
        Some(0)
    );
    assert_eq!(
        report
            .pointer(&["duplicate_analysis", "id", "most_common_value"])
            .and_then(ReportValue::as_i64),
        Some(2)
    );
    assert_eq!(
        report.get("group_analysis").unwrap().keys(),
        vec!["Finance", "HR", "IT"]
    );
}

// ============================================================================
// Report Invariant Tests
// ============================================================================

#[test]
fn test_total_rows_matches_every_column() {
    let dataset = load_fixture("employees.csv");
    let report = analyze_dataset(&dataset, &AnalysisConfig::default()).unwrap();
    let total_rows = report
        .pointer(&["metadata", "total_rows"])
        .and_then(ReportValue::as_i64)
        .unwrap() as usize;

    for column in dataset.columns() {
        let missing = report
            .pointer(&["duplicate_analysis", column.name(), "missing_values"])
            .and_then(ReportValue::as_i64)
            .unwrap() as usize;
        assert_eq!(missing + column.non_missing().count(), total_rows);
    }
}

#[test]
fn test_classification_is_deterministic() {
    let dataset = load_fixture("employees.csv");
    let classifier = SemanticClassifier::default();

    for column in dataset.columns() {
        assert_eq!(classifier.classify(column), classifier.classify(column));
    }

    let first = build_report(&dataset, &AnalysisConfig::default()).unwrap();
    let second = build_report(&dataset, &AnalysisConfig::default()).unwrap();
    assert_eq!(first.columns, second.columns);
}

#[test]
fn test_normalized_report_is_fixed_point() {
    let dataset = load_fixture("employees.csv");
    let report = analyze_dataset(&dataset, &grouped_by("score")).unwrap();

    assert!(report.is_normalized());
    assert_eq!(report.clone().normalize(), report);
}

#[test]
fn test_non_finite_values_serialize_as_null() {
    let dataset = Dataset::new(vec![Column::new(
        "reading",
        vec![
            Cell::Float(f64::INFINITY),
            Cell::Float(1.0),
            Cell::Float(2.0),
            Cell::Missing,
        ],
    )])
    .unwrap();
    let report = analyze_dataset(&dataset, &AnalysisConfig::default()).unwrap();

    assert!(
        report
            .pointer(&["numerical_analysis", "reading", "mean"])
            .unwrap()
            .is_null()
    );
    assert!(
        report
            .pointer(&["numerical_analysis", "reading", "max"])
            .unwrap()
            .is_null()
    );

    let json = serde_json::to_string(&report).unwrap();
    assert!(!json.contains("NaN"));
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed["numerical_analysis"]["reading"]["mean"].is_null());
}

#[test]
fn test_all_missing_column_does_not_abort_report() {
    let dataset = Dataset::new(vec![
        Column::from_texts("empty", [None, None, None]),
        Column::new("n", vec![Cell::Integer(1), Cell::Integer(1), Cell::Integer(2)]),
    ])
    .unwrap();
    let report = analyze_dataset(&dataset, &grouped_by("empty")).unwrap();

    let empty = column_entry(&report, "empty");
    assert_eq!(empty.get("type").and_then(ReportValue::as_str), Some("unknown"));
    assert!(empty.get("analysis").unwrap().is_null());

    let error = report
        .pointer(&["group_analysis", "error"])
        .and_then(ReportValue::as_str)
        .unwrap();
    assert!(error.starts_with("Group analysis failed"));
}

// ============================================================================
// Analyzer Behaviour Through The Public API
// ============================================================================

#[test]
fn test_currency_round_trip() {
    let column = texts("price", &["$1,000.00", "$2,000.00", "$1,000.00"]);
    let config = AnalysisConfig::default();

    assert_eq!(
        SemanticClassifier::default().classify(&column),
        SemanticType::Currency
    );
    match analyze_column(&column, SemanticType::Currency, &config) {
        Some(AnalyzerResult::Currency(analysis)) => {
            assert_eq!(analysis.symbol, "$");
            assert_eq!(analysis.count, 3);
            assert_eq!(analysis.unique_values, 2);
            assert_eq!(analysis.min, 1000.0);
            assert_eq!(analysis.max, 2000.0);
            assert!((analysis.mean - 4000.0 / 3.0).abs() < 1e-9);
        }
        other => panic!("expected currency analysis, got {other:?}"),
    }
}

#[test]
fn test_numeric_outlier_rule() {
    let column = Column::new("v", [1, 2, 3, 4, 100].into_iter().map(Cell::Integer).collect());
    match analyze_column(&column, SemanticType::Numeric, &AnalysisConfig::default()) {
        Some(AnalyzerResult::Numeric(analysis)) => {
            assert_eq!(analysis.q1, 2.0);
            assert_eq!(analysis.q3, 4.0);
            assert_eq!(analysis.iqr, 2.0);
            assert_eq!(analysis.outlier_count, 1);
            assert_eq!(analysis.outlier_examples, vec![100.0]);
        }
        other => panic!("expected numeric analysis, got {other:?}"),
    }
}

#[test]
fn test_boolean_tokens_are_case_insensitive() {
    let column = texts("flag", &["yes", "no", "YES", "maybe"]);
    match analyze_column(&column, SemanticType::Boolean, &AnalysisConfig::default()) {
        Some(AnalyzerResult::Boolean(analysis)) => {
            assert_eq!(analysis.true_count, 2);
            assert_eq!(analysis.false_count, 1);
            // "maybe" is neither true nor false
            assert_eq!(analysis.missing_values, 1);
        }
        other => panic!("expected boolean analysis, got {other:?}"),
    }
}

#[test]
fn test_sequential_id_detection() {
    let ids = |values: &[i64]| Column::new("id", values.iter().map(|v| Cell::Integer(*v)).collect());
    let sequential = |column: &Column| match analyze_column(
        column,
        SemanticType::Id,
        &AnalysisConfig::default(),
    ) {
        Some(AnalyzerResult::Id(analysis)) => analysis.sequential,
        other => panic!("expected id analysis, got {other:?}"),
    };

    assert!(sequential(&ids(&[1, 2, 3, 4, 5])));
    assert!(!sequential(&ids(&[1, 2, 4, 8])));
}
