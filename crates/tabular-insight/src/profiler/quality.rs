use crate::dataset::Dataset;
use crate::report::{ReportMap, ReportValue, ToReportValue};

/// Dataset-wide missing and duplicate counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuality {
    pub complete_duplicates_count: usize,
    pub total_missing_values: usize,
    pub missing_values_by_column: Vec<(String, usize)>,
}

impl DataQuality {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            complete_duplicates_count: dataset.complete_duplicate_rows(),
            total_missing_values: dataset.total_missing(),
            missing_values_by_column: dataset
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.missing_count()))
                .collect(),
        }
    }
}

impl ToReportValue for DataQuality {
    fn to_report_value(&self) -> ReportValue {
        let by_column: ReportMap = self.missing_values_by_column.iter().cloned().collect();
        ReportMap::new()
            .with("complete_duplicates_count", self.complete_duplicates_count)
            .with("total_missing_values", self.total_missing_values)
            .with("missing_values_by_column", by_column)
            .into()
    }
}
