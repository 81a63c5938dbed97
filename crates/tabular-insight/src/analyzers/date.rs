use super::{AnalyzerResult, ColumnAnalyzer};
use crate::config::AnalysisConfig;
use crate::dataset::{Cell, Column};
use crate::inference::parse_date;
use crate::report::{ReportMap, ReportValue, ToReportValue};
use crate::stats;
use crate::types::SemanticType;
use chrono::{Datelike, NaiveDateTime, TimeDelta};

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Range, central tendency, calendar breakdown and gap statistics of dates.
pub struct DateAnalyzer;

#[derive(Debug, Clone, PartialEq)]
pub struct DateAnalysis {
    pub min_date: NaiveDateTime,
    pub max_date: NaiveDateTime,
    pub range_days: i64,
    pub median_date: NaiveDateTime,
    pub most_common_date: NaiveDateTime,
    pub counts_by_year: Vec<(i32, usize)>,
    pub counts_by_month: Vec<(u32, usize)>,
    pub counts_by_weekday: Vec<(String, usize)>,
    pub gaps: Option<GapStats>,
}

/// Whole-day statistics over consecutive sorted differences.
#[derive(Debug, Clone, PartialEq)]
pub struct GapStats {
    pub average_gap_days: i64,
    pub min_gap_days: i64,
    pub max_gap_days: i64,
    pub std_gap_days: Option<i64>,
}

impl ColumnAnalyzer for DateAnalyzer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Date
    }

    fn analyze(&self, column: &Column, _config: &AnalysisConfig) -> AnalyzerResult {
        let dates: Vec<NaiveDateTime> = column.cells().iter().filter_map(to_datetime).collect();
        if dates.is_empty() {
            return AnalyzerResult::Empty;
        }

        let mut sorted = dates.clone();
        sorted.sort();
        let min_date = sorted[0];
        let max_date = sorted[sorted.len() - 1];

        let most_common_date = stats::value_counts_by(dates.iter().copied(), |a, b| a.cmp(b))
            .first()
            .map(|(date, _)| *date)
            .unwrap_or(min_date);

        AnalyzerResult::Date(DateAnalysis {
            min_date,
            max_date,
            range_days: (max_date - min_date).num_days(),
            median_date: median_datetime(&sorted),
            most_common_date,
            counts_by_year: stats::value_counts_by(dates.iter().map(|d| d.year()), |a, b| a.cmp(b)),
            counts_by_month: stats::value_counts_by(dates.iter().map(|d| d.month()), |a, b| {
                a.cmp(b)
            }),
            counts_by_weekday: stats::value_counts_by(
                dates.iter().map(|d| d.format("%A").to_string()),
                |a, b| a.cmp(b),
            ),
            gaps: gap_stats(&sorted),
        })
    }
}

fn to_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Timestamp(ts) => Some(*ts),
        Cell::Text(s) => parse_date(s),
        _ => None,
    }
}

/// Midpoint of the two middle values for an even count.
fn median_datetime(sorted: &[NaiveDateTime]) -> NaiveDateTime {
    let n = sorted.len();
    let upper = sorted[n / 2];
    if n % 2 == 1 {
        return upper;
    }
    let lower = sorted[(n - 1) / 2];
    lower + (upper - lower) / 2
}

fn floor_days(micros: f64) -> i64 {
    (micros / MICROS_PER_DAY).floor() as i64
}

fn gap_stats(sorted: &[NaiveDateTime]) -> Option<GapStats> {
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| micros(w[1] - w[0]))
        .collect();
    if gaps.is_empty() {
        return None;
    }

    Some(GapStats {
        average_gap_days: floor_days(stats::mean(&gaps)?),
        min_gap_days: floor_days(stats::min(&gaps)?),
        max_gap_days: floor_days(stats::max(&gaps)?),
        std_gap_days: stats::std_dev(&gaps).map(floor_days),
    })
}

fn micros(delta: TimeDelta) -> f64 {
    delta.num_microseconds().unwrap_or(i64::MAX) as f64
}

impl ToReportValue for DateAnalysis {
    fn to_report_value(&self) -> ReportValue {
        let by_year: ReportMap = self
            .counts_by_year
            .iter()
            .map(|(year, n)| (year.to_string(), *n))
            .collect();
        let by_month: ReportMap = self
            .counts_by_month
            .iter()
            .map(|(month, n)| (month.to_string(), *n))
            .collect();
        let by_weekday: ReportMap = self
            .counts_by_weekday
            .iter()
            .map(|(day, n)| (day.clone(), *n))
            .collect();
        let gaps = self.gaps.as_ref();

        ReportMap::new()
            .with("min_date", self.min_date)
            .with("max_date", self.max_date)
            .with("range_days", self.range_days)
            .with("median_date", self.median_date)
            .with("most_common_date", self.most_common_date)
            .with("counts_by_year", by_year)
            .with("counts_by_month", by_month)
            .with("counts_by_weekday", by_weekday)
            .with("average_gap_days", gaps.map(|g| g.average_gap_days))
            .with("min_gap_days", gaps.map(|g| g.min_gap_days))
            .with("max_gap_days", gaps.map(|g| g.max_gap_days))
            .with("std_gap_days", gaps.and_then(|g| g.std_gap_days))
            .into()
    }
}
