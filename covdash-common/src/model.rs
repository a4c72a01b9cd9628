//! Report and record data model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::region::province_of;

/// Province value the source uses for rows it could not attribute
pub const UNKNOWN_PROVINCE: &str = "Unknown";

/// One raw report row as delivered by the statistics API or a CSV export
///
/// Every metric is optional: a missing value is a missing-data cell, not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub date: Option<NaiveDate>,
    pub confirmed: Option<i64>,
    pub deaths: Option<i64>,
    pub recovered: Option<i64>,
    pub confirmed_diff: Option<i64>,
    pub deaths_diff: Option<i64>,
    pub recovered_diff: Option<i64>,
    pub last_update: Option<String>,
    pub active: Option<i64>,
    pub active_diff: Option<i64>,
    pub fatality_rate: Option<f64>,
    /// Nested region metadata (iso, name, province, lat, long, cities)
    #[serde(default)]
    pub region: Map<String, Value>,
    /// ISO country code
    #[serde(default)]
    pub country: String,
    /// Display name of the country
    #[serde(default)]
    pub country_name: String,
}

/// A report after province extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRecord {
    pub country: String,
    pub country_name: String,
    /// Empty when the region carries no province
    pub province: String,
    pub date: Option<NaiveDate>,
    pub confirmed: Option<i64>,
    pub deaths: Option<i64>,
    pub active: Option<i64>,
    pub confirmed_diff: Option<i64>,
    pub deaths_diff: Option<i64>,
    pub active_diff: Option<i64>,
    pub fatality_rate: Option<f64>,
}

impl CaseRecord {
    pub fn from_report(report: &Report) -> Self {
        Self {
            country: report.country.clone(),
            country_name: report.country_name.clone(),
            province: province_of(&report.region).unwrap_or_default().to_string(),
            date: report.date,
            confirmed: report.confirmed,
            deaths: report.deaths,
            active: report.active,
            confirmed_diff: report.confirmed_diff,
            deaths_diff: report.deaths_diff,
            active_diff: report.active_diff,
            fatality_rate: report.fatality_rate,
        }
    }

    pub fn is_unknown_province(&self) -> bool {
        self.province == UNKNOWN_PROVINCE
    }

    /// Join key used by every merge: (province, country name)
    pub fn key(&self) -> (&str, &str) {
        (&self.province, &self.country_name)
    }
}

/// Cumulative metric with a day-over-day delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Deaths,
    Active,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Active => "active",
        }
    }

    /// Chart label for the increase percentage of this metric
    pub fn increase_label(self) -> &'static str {
        match self {
            Metric::Active => "Actieve Toename (%)",
            Metric::Confirmed => "Gediagnosticeerde Toename (%)",
            Metric::Deaths => "Sterfgevallen Toename (%)",
        }
    }

    pub fn current(self, record: &CaseRecord) -> Option<i64> {
        match self {
            Metric::Confirmed => record.confirmed,
            Metric::Deaths => record.deaths,
            Metric::Active => record.active,
        }
    }

    pub fn diff(self, record: &CaseRecord) -> Option<i64> {
        match self {
            Metric::Confirmed => record.confirmed_diff,
            Metric::Deaths => record.deaths_diff,
            Metric::Active => record.active_diff,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::parse_region;

    fn report(province_literal: &str) -> Report {
        Report {
            confirmed: Some(10),
            confirmed_diff: Some(2),
            region: parse_region(province_literal),
            country: "NLD".to_string(),
            country_name: "Nederland".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_report_extracts_province() {
        let record = CaseRecord::from_report(&report("{'province': 'Drenthe'}"));
        assert_eq!(record.province, "Drenthe");
        assert_eq!(record.key(), ("Drenthe", "Nederland"));
        assert!(!record.is_unknown_province());
    }

    #[test]
    fn test_from_report_missing_province_is_empty() {
        let record = CaseRecord::from_report(&report("garbage"));
        assert_eq!(record.province, "");
    }

    #[test]
    fn test_unknown_province_detected() {
        let record = CaseRecord::from_report(&report("{'province': 'Unknown'}"));
        assert!(record.is_unknown_province());
    }

    #[test]
    fn test_metric_accessors() {
        let record = CaseRecord::from_report(&report("{'province': 'Drenthe'}"));
        assert_eq!(Metric::Confirmed.current(&record), Some(10));
        assert_eq!(Metric::Confirmed.diff(&record), Some(2));
        assert_eq!(Metric::Deaths.current(&record), None);
    }

    #[test]
    fn test_api_report_deserializes() {
        let json = r#"{
            "date": "2023-03-09", "confirmed": 100, "deaths": 3, "recovered": 0,
            "confirmed_diff": 4, "deaths_diff": 0, "recovered_diff": 0,
            "last_update": "2023-03-10 04:21:03", "active": 97, "active_diff": 4,
            "fatality_rate": 0.03,
            "region": {"iso": "NLD", "name": "Netherlands", "province": "Drenthe", "cities": []}
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2023, 3, 9));
        assert_eq!(province_of(&report.region), Some("Drenthe"));
        assert_eq!(report.country, "");
    }
}
