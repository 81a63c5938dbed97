//! Tree of report values and its JSON-safe normalization.
//!
//! Analyzers and the profiler build [`ReportValue`] trees that may still carry
//! native leaves (non-finite floats, timestamps, bin intervals). [`ReportValue::normalize`]
//! rewrites those leaves into JSON primitives exactly once, at the end of
//! report assembly.

use crate::dataset::Cell;
use crate::grouping::BinInterval;
use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// ISO-8601 layout used for timestamps in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A node of the report tree. Map entries keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    Interval(BinInterval),
    List(Vec<ReportValue>),
    Map(Vec<(String, ReportValue)>),
}

impl ReportValue {
    /// Convert every leaf into a JSON-safe primitive.
    ///
    /// Non-finite floats become `Null`, timestamps become ISO-8601 text and
    /// intervals their `(a, b]` label. Normalizing a normalized tree is a no-op.
    pub fn normalize(self) -> ReportValue {
        match self {
            ReportValue::Float(v) if !v.is_finite() => ReportValue::Null,
            ReportValue::Timestamp(ts) => ReportValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
            ReportValue::Interval(interval) => ReportValue::Text(interval.to_string()),
            ReportValue::List(items) => {
                ReportValue::List(items.into_iter().map(ReportValue::normalize).collect())
            }
            ReportValue::Map(entries) => ReportValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.normalize()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// True when no leaf needs normalizing.
    pub fn is_normalized(&self) -> bool {
        match self {
            ReportValue::Float(v) => v.is_finite(),
            ReportValue::Timestamp(_) | ReportValue::Interval(_) => false,
            ReportValue::List(items) => items.iter().all(ReportValue::is_normalized),
            ReportValue::Map(entries) => entries.iter().all(|(_, v)| v.is_normalized()),
            _ => true,
        }
    }

    /// Look up a key in a map node.
    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        match self {
            ReportValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Follow a path of map keys.
    pub fn pointer(&self, path: &[&str]) -> Option<&ReportValue> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ReportValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReportValue::Float(v) => Some(*v),
            ReportValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ReportValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ReportValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReportValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ReportValue]> {
        match self {
            ReportValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Keys of a map node, in order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            ReportValue::Map(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

impl Serialize for ReportValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ReportValue::Null => serializer.serialize_unit(),
            ReportValue::Bool(v) => serializer.serialize_bool(*v),
            ReportValue::Int(v) => serializer.serialize_i64(*v),
            ReportValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            ReportValue::Float(_) => serializer.serialize_unit(),
            ReportValue::Text(s) => serializer.serialize_str(s),
            ReportValue::Timestamp(ts) => {
                serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
            }
            ReportValue::Interval(interval) => serializer.collect_str(interval),
            ReportValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ReportValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for ReportValue {
    fn from(value: bool) -> Self {
        ReportValue::Bool(value)
    }
}

impl From<i64> for ReportValue {
    fn from(value: i64) -> Self {
        ReportValue::Int(value)
    }
}

impl From<i32> for ReportValue {
    fn from(value: i32) -> Self {
        ReportValue::Int(value.into())
    }
}

impl From<u32> for ReportValue {
    fn from(value: u32) -> Self {
        ReportValue::Int(value.into())
    }
}

impl From<usize> for ReportValue {
    fn from(value: usize) -> Self {
        ReportValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ReportValue {
    fn from(value: f64) -> Self {
        ReportValue::Float(value)
    }
}

impl From<&str> for ReportValue {
    fn from(value: &str) -> Self {
        ReportValue::Text(value.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(value: String) -> Self {
        ReportValue::Text(value)
    }
}

impl From<NaiveDateTime> for ReportValue {
    fn from(value: NaiveDateTime) -> Self {
        ReportValue::Timestamp(value)
    }
}

impl From<&Cell> for ReportValue {
    fn from(value: &Cell) -> Self {
        match value {
            Cell::Missing => ReportValue::Null,
            Cell::Boolean(b) => ReportValue::Bool(*b),
            Cell::Integer(v) => ReportValue::Int(*v),
            Cell::Float(v) => ReportValue::Float(*v),
            Cell::Text(s) => ReportValue::Text(s.clone()),
            Cell::Timestamp(ts) => ReportValue::Timestamp(*ts),
        }
    }
}

impl From<BinInterval> for ReportValue {
    fn from(value: BinInterval) -> Self {
        ReportValue::Interval(value)
    }
}

impl<T: Into<ReportValue>> From<Option<T>> for ReportValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ReportValue::Null)
    }
}

impl<T: Into<ReportValue>> From<Vec<T>> for ReportValue {
    fn from(value: Vec<T>) -> Self {
        ReportValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<ReportMap> for ReportValue {
    fn from(value: ReportMap) -> Self {
        ReportValue::Map(value.0)
    }
}

/// Ordered builder for map nodes.
///
/// ```rust,ignore
/// let node: ReportValue = ReportMap::new()
///     .with("count", 3usize)
///     .with("mean", Some(1.5))
///     .into();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportMap(Vec<(String, ReportValue)>);

impl ReportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return the builder.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ReportValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Append an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ReportValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ReportValue>> FromIterator<(K, V)> for ReportMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Conversion of a typed report section into a [`ReportValue`] node.
pub trait ToReportValue {
    fn to_report_value(&self) -> ReportValue;
}
