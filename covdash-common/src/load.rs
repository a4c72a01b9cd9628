//! Report loading from CSV exports and the remote statistics API

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::countries::display_name;
use crate::model::Report;
use crate::region::{parse_region, RegionInfo};
use crate::{Error, Result};

/// Columns a CSV export must carry for the pipeline to run
pub const REQUIRED_COLUMNS: &[&str] = &[
    "confirmed",
    "deaths",
    "active",
    "confirmed_diff",
    "deaths_diff",
    "active_diff",
    "fatality_rate",
    "country_name",
    "region",
];

const USER_AGENT: &str = concat!("covdash/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Raw CSV row; counts may be float-formatted (`12.0`) by the exporter
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    confirmed: Option<f64>,
    #[serde(default)]
    deaths: Option<f64>,
    #[serde(default)]
    recovered: Option<f64>,
    #[serde(default)]
    confirmed_diff: Option<f64>,
    #[serde(default)]
    deaths_diff: Option<f64>,
    #[serde(default)]
    recovered_diff: Option<f64>,
    #[serde(default)]
    last_update: Option<String>,
    #[serde(default)]
    active: Option<f64>,
    #[serde(default)]
    active_diff: Option<f64>,
    #[serde(default)]
    fatality_rate: Option<f64>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
}

impl CsvRow {
    fn into_report(self) -> Report {
        let region = self.region.as_deref().map(parse_region).unwrap_or_default();
        // Exports without a country column still carry the code in the region
        let country = match self.country {
            Some(code) if !code.trim().is_empty() => code,
            _ => RegionInfo::from_map(&region).iso.unwrap_or_default(),
        };
        let country_name = match self.country_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => display_name(&country),
        };

        Report {
            date: self.date.as_deref().and_then(parse_date),
            confirmed: count(self.confirmed),
            deaths: count(self.deaths),
            recovered: count(self.recovered),
            confirmed_diff: count(self.confirmed_diff),
            deaths_diff: count(self.deaths_diff),
            recovered_diff: count(self.recovered_diff),
            last_update: self.last_update,
            active: count(self.active),
            active_diff: count(self.active_diff),
            fatality_rate: self.fatality_rate.filter(|v| v.is_finite()),
            region,
            country,
            country_name,
        }
    }
}

fn count(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.round() as i64)
}

/// Accepts `2023-03-09` and timestamp forms such as `2023-03-09 00:00:00`
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Reports decoded from a CSV export, plus the header it carried
#[derive(Debug, Clone)]
pub struct CsvExport {
    /// Column names in file order
    pub columns: Vec<String>,
    pub reports: Vec<Report>,
}

/// Load reports from a CSV file
pub fn load_csv(path: &Path) -> Result<CsvExport> {
    let file = std::fs::File::open(path)?;
    let export = read_csv(file)?;
    info!(
        path = %path.display(),
        rows = export.reports.len(),
        columns = export.columns.len(),
        "Loaded CSV reports"
    );
    Ok(export)
}

/// Load reports from any CSV source with a header row
pub fn load_csv_from_reader<R: Read>(reader: R) -> Result<Vec<Report>> {
    Ok(read_csv(reader)?.reports)
}

/// Decode a CSV export, keeping its column names
pub fn read_csv<R: Read>(reader: R) -> Result<CsvExport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(Error::InvalidInput(format!(
            "CSV is missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut reports = Vec::new();
    for row in csv_reader.deserialize::<CsvRow>() {
        reports.push(row?.into_report());
    }

    debug!(rows = reports.len(), "Decoded CSV rows");
    Ok(CsvExport {
        columns: headers.iter().map(str::to_string).collect(),
        reports,
    })
}

/// `/reports` response envelope; error responses carry no `data`
#[derive(Debug, Deserialize)]
struct ReportsResponse {
    #[serde(default)]
    data: Option<Vec<Report>>,
}

/// Client for the covid-19-statistics `/reports` endpoint
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, host: &str, api_key: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            host: host.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch the reports of one country, tagging each with its code and name
    pub async fn fetch_country(&self, iso: &str) -> Result<Vec<Report>> {
        let url = format!("{}/reports", self.base_url);
        debug!(iso = %iso, url = %url, "Querying statistics API");

        let response = self
            .http_client
            .get(&url)
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", &self.api_key)
            .query(&[("iso", iso)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let body: ReportsResponse = serde_json::from_str(&text)?;
        let Some(mut reports) = body.data else {
            warn!(iso = %iso, "Statistics API response has no data");
            return Ok(Vec::new());
        };

        let name = display_name(iso);
        for report in &mut reports {
            report.country = iso.to_string();
            report.country_name = name.clone();
        }
        Ok(reports)
    }

    /// Fetch reports for every country code, in order
    pub async fn fetch_reports(&self, countries: &[String]) -> Result<Vec<Report>> {
        let mut all = Vec::new();
        for iso in countries {
            let reports = self.fetch_country(iso).await?;
            debug!(iso = %iso, rows = reports.len(), "Fetched country reports");
            all.extend(reports);
        }

        info!(
            countries = countries.len(),
            rows = all.len(),
            "Fetched reports from statistics API"
        );
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "country,date,confirmed,deaths,confirmed_diff,deaths_diff,active,active_diff,fatality_rate,region,country_name";

    #[test]
    fn test_load_csv_basic_row() {
        let csv = format!(
            "{HEADER}\nNLD,2023-03-09,110.0,5,10,1,20,-2,0.045,\"{{'iso': 'NLD', 'province': 'Drenthe'}}\",Nederland\n"
        );
        let reports = load_csv_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(reports.len(), 1);

        let r = &reports[0];
        assert_eq!(r.country, "NLD");
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2023, 3, 9));
        assert_eq!(r.confirmed, Some(110));
        assert_eq!(r.active_diff, Some(-2));
        assert_eq!(r.recovered, None);
        assert_eq!(r.region["province"], "Drenthe");
    }

    #[test]
    fn test_load_csv_empty_cells_are_missing() {
        let csv = format!("{HEADER}\nBEL,,,,,,,,,,\n");
        let reports = load_csv_from_reader(csv.as_bytes()).unwrap();
        let r = &reports[0];
        assert_eq!(r.confirmed, None);
        assert_eq!(r.fatality_rate, None);
        assert!(r.region.is_empty());
        // Name falls back to the code lookup
        assert_eq!(r.country_name, "België");
    }

    #[test]
    fn test_read_csv_keeps_columns() {
        let csv = format!("{HEADER}\nNLD,2023-03-09,1,0,0,0,1,0,0.0,{{}},Nederland\n");
        let export = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(export.columns.len(), 11);
        assert_eq!(export.columns[0], "country");
        assert!(!export.columns.iter().any(|c| c == "recovered"));
        assert_eq!(export.reports.len(), 1);
    }

    #[test]
    fn test_load_csv_missing_column_is_error() {
        let csv = "confirmed,deaths\n1,2\n";
        let err = load_csv_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("region")));
    }

    #[test]
    fn test_load_csv_bad_number_is_error() {
        let csv = format!("{HEADER}\nNLD,2023-03-09,abc,5,10,1,20,-2,0.045,{{}},Nederland\n");
        assert!(matches!(
            load_csv_from_reader(csv.as_bytes()),
            Err(Error::Csv(_))
        ));
    }

    #[test]
    fn test_load_csv_country_from_region() {
        let csv = "confirmed,deaths,active,confirmed_diff,deaths_diff,active_diff,fatality_rate,region,country_name\n\
                   10,1,9,0,0,0,0.1,\"{'iso': 'LUX', 'province': ''}\",\n";
        let reports = load_csv_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(reports[0].country, "LUX");
        assert_eq!(reports[0].country_name, "Luxemburg");
    }

    #[test]
    fn test_reports_response_without_data() {
        let body: ReportsResponse = serde_json::from_str(r#"{"message": "quota"}"#).unwrap();
        assert!(body.data.is_none());

        let body: ReportsResponse =
            serde_json::from_str(r#"{"data": [{"confirmed": 5, "region": {"province": "Drenthe"}}]}"#)
                .unwrap();
        assert_eq!(body.data.unwrap()[0].confirmed, Some(5));
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(parse_date("2023-03-09"), NaiveDate::from_ymd_opt(2023, 3, 9));
        assert_eq!(
            parse_date("2023-03-09 04:21:03"),
            NaiveDate::from_ymd_opt(2023, 3, 9)
        );
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("https://example.invalid/", "example.invalid", "key");
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "https://example.invalid");
    }
}
