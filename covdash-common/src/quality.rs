//! Missing-data overview for the loaded reports

use serde::Serialize;

use crate::model::Report;

/// Missing cell count of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMissing {
    pub column: &'static str,
    pub missing: usize,
}

/// Per-column missing-value counts, in source column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDataSummary {
    pub rows: usize,
    pub columns: Vec<ColumnMissing>,
    pub total_missing: usize,
}

type MissingCheck = fn(&Report) -> bool;

const MISSING_CHECKS: &[(&str, MissingCheck)] = &[
    ("date", |r| r.date.is_none()),
    ("confirmed", |r| r.confirmed.is_none()),
    ("deaths", |r| r.deaths.is_none()),
    ("recovered", |r| r.recovered.is_none()),
    ("confirmed_diff", |r| r.confirmed_diff.is_none()),
    ("deaths_diff", |r| r.deaths_diff.is_none()),
    ("recovered_diff", |r| r.recovered_diff.is_none()),
    ("last_update", |r| r.last_update.is_none()),
    ("active", |r| r.active.is_none()),
    ("active_diff", |r| r.active_diff.is_none()),
    ("fatality_rate", |r| r.fatality_rate.is_none()),
    ("region", |r| r.region.is_empty()),
    ("country_name", |r| r.country_name.trim().is_empty()),
];

impl MissingDataSummary {
    /// Count every known column
    pub fn from_reports(reports: &[Report]) -> Self {
        Self::summarize(reports, |_| true)
    }

    /// Count only the columns the source actually carried
    ///
    /// A column absent from a CSV header is not a missing-data column.
    pub fn for_columns(reports: &[Report], present: &[String]) -> Self {
        Self::summarize(reports, |column| present.iter().any(|p| p == column))
    }

    fn summarize(reports: &[Report], include: impl Fn(&str) -> bool) -> Self {
        let columns: Vec<ColumnMissing> = MISSING_CHECKS
            .iter()
            .filter(|(column, _)| include(column))
            .map(|&(column, is_missing)| ColumnMissing {
                column,
                missing: reports.iter().filter(|r| is_missing(r)).count(),
            })
            .collect();
        let total_missing = columns.iter().map(|c| c.missing).sum();

        Self {
            rows: reports.len(),
            columns,
            total_missing,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_missing == 0
    }

    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.missing)
    }
}
