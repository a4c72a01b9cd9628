//! Cached base table
//!
//! A `Dataset` is built once per load (startup or reload) and shared read-only
//! by every request; all derived tables are recomputed from it on demand.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::charts::DatePair;
use crate::load::CsvExport;
use crate::model::{CaseRecord, Report};
use crate::quality::MissingDataSummary;

/// Reporting date assumed when no row carries a date
pub const DEFAULT_REFERENCE_DATE: &str = "2023-03-09";

/// Where the data came from and what loading it produced
#[derive(Debug, Clone, Serialize)]
pub struct LoadInfo {
    /// Human-readable source description (file path or API URL)
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    /// Rows as delivered by the source
    pub report_rows: usize,
    /// Rows left after dropping `Unknown` provinces
    pub record_rows: usize,
    /// Rows whose region field was absent or malformed
    pub empty_regions: usize,
    pub countries: usize,
    /// Reporting date of the cumulative counts
    pub current_date: NaiveDate,
    /// Day reconstructed by subtracting the deltas
    pub previous_date: NaiveDate,
}

impl LoadInfo {
    pub fn dates(&self) -> DatePair {
        DatePair {
            previous: self.previous_date,
            current: self.current_date,
        }
    }
}

/// Loaded reports plus everything derived at load time
#[derive(Debug, Clone)]
pub struct Dataset {
    pub reports: Vec<Report>,
    pub records: Vec<CaseRecord>,
    pub missing: MissingDataSummary,
    pub info: LoadInfo,
}

impl Dataset {
    /// Build the base table from raw reports
    ///
    /// `reference_date` is used only when no report carries a date.
    pub fn from_reports(reports: Vec<Report>, source: &str, reference_date: NaiveDate) -> Self {
        let missing = MissingDataSummary::from_reports(&reports);
        Self::build(reports, missing, source, reference_date)
    }

    /// Build the base table from a CSV export
    ///
    /// Optional columns the export does not carry are left out of the
    /// missing-data summary.
    pub fn from_csv(export: CsvExport, source: &str, reference_date: NaiveDate) -> Self {
        let missing = MissingDataSummary::for_columns(&export.reports, &export.columns);
        Self::build(export.reports, missing, source, reference_date)
    }

    fn build(
        reports: Vec<Report>,
        missing: MissingDataSummary,
        source: &str,
        reference_date: NaiveDate,
    ) -> Self {
        let empty_regions = reports.iter().filter(|r| r.region.is_empty()).count();
        if empty_regions > 0 {
            warn!(
                empty_regions,
                "Region field missing or malformed; rows kept without province"
            );
        }

        let records: Vec<CaseRecord> = reports
            .iter()
            .map(CaseRecord::from_report)
            .filter(|record| !record.is_unknown_province())
            .collect();

        let current_date = reports
            .iter()
            .filter_map(|r| r.date)
            .max()
            .unwrap_or(reference_date);
        let previous_date = current_date.pred_opt().unwrap_or(current_date);

        let mut countries: Vec<&str> = records.iter().map(|r| r.country_name.as_str()).collect();
        countries.sort_unstable();
        countries.dedup();

        let info = LoadInfo {
            source: source.to_string(),
            loaded_at: Utc::now(),
            report_rows: reports.len(),
            record_rows: records.len(),
            empty_regions,
            countries: countries.len(),
            current_date,
            previous_date,
        };

        info!(
            source = %info.source,
            reports = info.report_rows,
            records = info.record_rows,
            countries = info.countries,
            current_date = %info.current_date,
            "Dataset ready"
        );

        Self {
            reports,
            records,
            missing,
            info,
        }
    }

    /// Default reference date as a `NaiveDate`
    pub fn default_reference_date() -> NaiveDate {
        NaiveDate::parse_from_str(DEFAULT_REFERENCE_DATE, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
