//! Report model and assembly.
//!
//! [`analyze_dataset`] runs every component over a [`Dataset`](crate::dataset::Dataset)
//! and returns the normalized [`ReportValue`] tree. [`Report`] is the typed
//! form of the same data, for callers that want to inspect sections before
//! serializing.

mod assembler;
mod value;

pub use assembler::{ColumnReport, Report, ReportMetadata, analyze_dataset, build_report};
pub use value::{ReportMap, ReportValue, TIMESTAMP_FORMAT, ToReportValue};
