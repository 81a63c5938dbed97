//! CSV ingestion and the bundled demo dataset.

use crate::dataset::{Cell, Column, Dataset};
use crate::error::{AnalysisError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Rows used to infer the CSV schema.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a CSV file into a polars frame, trying progressively more lenient
/// strategies.
///
/// 1. Standard reading with `"` quoting
/// 2. Default parse options
/// 3. Reading a pre-cleaned copy of the content (collapsed doubled quotes,
///    blank lines removed)
pub fn load_csv_with_fallbacks(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading with default options failed: {}", e),
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        error!("Could not read file: {}", e);
        AnalysisError::Io(e)
    })?;
    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(clean_csv_content(&content)))
        .finish()
        .context(format!("Failed to parse CSV '{}'", path.display()))
}

/// Load a CSV file straight into a [`Dataset`].
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let df = load_csv_with_fallbacks(path)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Dataset loaded"
    );
    Dataset::from_dataframe(&df)
}

fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Small employee table for trying the analysis without a file.
///
/// Row 6 repeats Bob's id and name, so the duplicate profile is non-trivial.
pub fn sample_dataset() -> Result<Dataset> {
    let ints = |values: &[i64]| values.iter().map(|v| Cell::Integer(*v)).collect::<Vec<_>>();
    let texts = |values: &[&str]| values.iter().map(|v| Cell::from(*v)).collect::<Vec<_>>();

    let columns = vec![
        Column::new("id", ints(&[1, 2, 3, 4, 5, 2, 6])),
        Column::new(
            "name",
            texts(&["Alice", "Bob", "Charlie", "David", "Eve", "Bob", "Frank"]),
        ),
        Column::new("age", ints(&[25, 30, 35, 40, 28, 30, 45])),
        Column::new(
            "salary",
            ints(&[50000, 60000, 70000, 80000, 55000, 62000, 90000]),
        ),
        Column::new(
            "department",
            texts(&["HR", "IT", "IT", "Finance", "HR", "IT", "Finance"]),
        ),
    ];

    Dataset::new(columns)
}
