//! In-memory tabular dataset consumed by the analysis engine.
//!
//! A [`Dataset`] is an ordered set of named [`Column`]s of equal length. Each
//! column holds dynamically typed [`Cell`]s plus the [`StorageType`] the values
//! were decoded as. Datasets are usually built from a polars [`DataFrame`]
//! produced by a CSV reader; [`Dataset::new`] is available for callers that
//! already hold decoded values.

use crate::error::{AnalysisError, Result, ResultExt};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{DataFrame, DataType, Series, TimeUnit};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Cell {
    /// Build a float cell; NaN is a missing value, never a number.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Cell::Missing
        } else {
            Cell::Float(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Text form used for heuristics, distinct counting and map keys.
    ///
    /// Floats with an integral value keep a trailing `.0` so `1.0` never
    /// collides with the boolean token `1`.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Boolean(true) => Some("True".to_string()),
            Cell::Boolean(false) => Some("False".to_string()),
            Cell::Integer(v) => Some(v.to_string()),
            Cell::Float(v) => Some(format_float(*v)),
            Cell::Text(s) => Some(s.clone()),
            Cell::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Numeric coercion; unparseable text and timestamps give `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Integer(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
                }
            }
            Cell::Missing | Cell::Timestamp(_) => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Missing => 0,
            Cell::Boolean(_) => 1,
            Cell::Integer(_) | Cell::Float(_) => 2,
            Cell::Timestamp(_) => 3,
            Cell::Text(_) => 4,
        }
    }

    /// Natural ordering: numbers numerically, text lexicographically,
    /// different kinds by a fixed kind rank.
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Boolean(a), Cell::Boolean(b)) => a.cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Timestamp(a), Cell::Timestamp(b)) => a.cmp(b),
            (a, b) if a.rank() == 2 && b.rank() == 2 => {
                let x = a.to_number().unwrap_or(f64::NAN);
                let y = b.to_number().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn storage_kind(&self) -> Option<StorageType> {
        match self {
            Cell::Missing => None,
            Cell::Boolean(_) => Some(StorageType::Boolean),
            Cell::Integer(_) => Some(StorageType::Integer),
            Cell::Float(_) => Some(StorageType::Float),
            Cell::Text(_) => Some(StorageType::Text),
            Cell::Timestamp(_) => Some(StorageType::Timestamp),
        }
    }

    fn estimated_bytes(&self) -> usize {
        match self {
            Cell::Boolean(_) => 1,
            Cell::Text(s) => s.len() + 24,
            _ => 8,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Boolean(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::from_f64(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::Timestamp(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Missing)
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// How a column's values were stored before semantic inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    Boolean,
    Integer,
    Float,
    Text,
    Timestamp,
}

impl StorageType {
    /// Label reported in `metadata.data_types`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Integer => "int64",
            Self::Float => "float64",
            Self::Text => "object",
            Self::Timestamp => "datetime64",
        }
    }

    /// Numeric for the generic summary, booleans included.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Boolean | Self::Integer | Self::Float)
    }

    /// Integer or float, the columns aggregated per group.
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    storage: StorageType,
    cells: Vec<Cell>,
}

impl Column {
    /// Create a column, inferring its storage type from the cells.
    ///
    /// Uniform cells keep their kind, integers mixed with floats widen to
    /// float, anything else (including an all-missing column) is text.
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let cells: Vec<Cell> = cells
            .into_iter()
            .map(|cell| match cell {
                Cell::Float(v) if v.is_nan() => Cell::Missing,
                other => other,
            })
            .collect();
        let storage = infer_storage(&cells);
        Self {
            name: name.into(),
            storage,
            cells,
        }
    }

    /// Create a column with an explicit storage type.
    pub fn with_storage(name: impl Into<String>, storage: StorageType, cells: Vec<Cell>) -> Self {
        let mut column = Self::new(name, cells);
        column.storage = storage;
        column
    }

    /// Convenience constructor for columns of text or missing values.
    pub fn from_texts<'a>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Self {
        Self::new(name, values.into_iter().map(Cell::from).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> StorageType {
        self.storage
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    /// Cells with missing values dropped, in row order.
    pub fn non_missing(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.is_missing())
    }

    /// Text renderings of the non-missing cells, in row order.
    pub fn rendered(&self) -> Vec<String> {
        self.cells.iter().filter_map(Cell::render).collect()
    }

    /// Numeric coercion of the non-missing cells; failures are dropped.
    pub fn numbers(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::to_number).collect()
    }

    fn estimated_bytes(&self) -> usize {
        self.cells.iter().map(Cell::estimated_bytes).sum()
    }
}

fn infer_storage(cells: &[Cell]) -> StorageType {
    let mut kinds = cells.iter().filter_map(Cell::storage_kind);
    let Some(first) = kinds.next() else {
        return StorageType::Text;
    };

    kinds.fold(first, |acc, kind| match (acc, kind) {
        (a, b) if a == b => a,
        (StorageType::Integer, StorageType::Float) | (StorageType::Float, StorageType::Integer) => {
            StorageType::Float
        }
        _ => StorageType::Text,
    })
}

/// An ordered set of equal-length named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    height: usize,
}

impl Dataset {
    /// Build a dataset, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(AnalysisError::EmptyDataset);
        };
        let height = first.len();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(AnalysisError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != height {
                return Err(AnalysisError::RaggedColumns {
                    column: column.name().to_string(),
                    expected: height,
                    actual: column.len(),
                });
            }
        }

        Ok(Self { columns, height })
    }

    /// Convert a polars frame into a dataset.
    ///
    /// Integers widen to `i64`, floats to `f64` (NaN becomes missing),
    /// dates and datetimes become naive UTC timestamps, and every other
    /// dtype is cast to text.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            let (storage, cells) = cells_from_series(series)
                .context(format!("Failed to read column '{name}'"))?;
            columns.push(Column::with_storage(name, storage, cells));
        }
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Rough in-memory footprint of the cell values.
    pub fn estimated_bytes(&self) -> usize {
        self.columns.iter().map(Column::estimated_bytes).sum()
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Rows identical to an earlier row; the first occurrence is kept.
    pub fn complete_duplicate_rows(&self) -> usize {
        let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(self.height);
        (0..self.height)
            .filter(|&row| {
                let key: Vec<Option<String>> = self
                    .columns
                    .iter()
                    .map(|c| c.cells[row].render())
                    .collect();
                !seen.insert(key)
            })
            .count()
    }
}

fn cells_from_series(series: &Series) -> Result<(StorageType, Vec<Cell>)> {
    let result = match series.dtype() {
        DataType::Boolean => {
            let values = series.bool()?;
            let cells: Vec<Cell> = values.into_iter().map(Cell::from).collect();
            (StorageType::Boolean, cells)
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let widened = series.cast(&DataType::Int64)?;
            let cells: Vec<Cell> = widened.i64()?.into_iter().map(Cell::from).collect();
            (StorageType::Integer, cells)
        }
        DataType::UInt64 => unsigned_cells(series)?,
        DataType::Float32 | DataType::Float64 => {
            let widened = series.cast(&DataType::Float64)?;
            let cells: Vec<Cell> = widened.f64()?.into_iter().map(Cell::from).collect();
            (StorageType::Float, cells)
        }
        DataType::String => {
            let cells: Vec<Cell> = series.str()?.into_iter().map(Cell::from).collect();
            (StorageType::Text, cells)
        }
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            let cells: Vec<Cell> = days
                .i32()?
                .into_iter()
                .map(|v| Cell::from(v.and_then(date_from_epoch_days)))
                .collect();
            (StorageType::Timestamp, cells)
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            let cells: Vec<Cell> = raw
                .i64()?
                .into_iter()
                .map(|v| Cell::from(v.and_then(|v| datetime_from_epoch(v, unit))))
                .collect();
            (StorageType::Timestamp, cells)
        }
        _ => {
            let text = series.cast(&DataType::String)?;
            let cells: Vec<Cell> = text.str()?.into_iter().map(Cell::from).collect();
            (StorageType::Text, cells)
        }
    };
    Ok(result)
}

/// `u64` values above `i64::MAX` widen the whole column to float.
fn unsigned_cells(series: &Series) -> Result<(StorageType, Vec<Cell>)> {
    let values = series.u64()?;
    let overflow = values
        .into_iter()
        .flatten()
        .filter(|v| i64::try_from(*v).is_err())
        .count();

    if overflow == 0 {
        let cells: Vec<Cell> = values
            .into_iter()
            .map(|v| Cell::from(v.and_then(|v| i64::try_from(v).ok())))
            .collect();
        return Ok((StorageType::Integer, cells));
    }

    warn!(
        column = %series.name(),
        overflow,
        "Unsigned values exceed i64, storing column as float"
    );
    let cells: Vec<Cell> = values
        .into_iter()
        .map(|v| Cell::from(v.map(|v| v as f64)))
        .collect();
    Ok((StorageType::Float, cells))
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn datetime_from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let utc = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    utc.map(|dt| dt.naive_utc())
}
