//! Chart-ready series
//!
//! Nothing here renders; the browser draws these structures as SVG.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::increase::{index_by_key, CountryIncrease, IncreaseRow, IncreaseSummary};
use crate::model::{CaseRecord, Metric};
use crate::regression::LinearFit;
use crate::Result;

/// Which of the two reporting dates a series shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingDate {
    #[default]
    Previous,
    Current,
}

/// The pair of dates the increase tables span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatePair {
    pub previous: NaiveDate,
    pub current: NaiveDate,
}

impl DatePair {
    pub fn get(&self, which: ReportingDate) -> NaiveDate {
        match which {
            ReportingDate::Previous => self.previous,
            ReportingDate::Current => self.current,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Confirmed and death counts of one province on both dates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub country_name: String,
    pub province: String,
    pub confirmed_previous: i64,
    pub confirmed_current: i64,
    pub deaths_previous: i64,
    pub deaths_current: i64,
}

impl ComparisonPoint {
    fn xy(&self, which: ReportingDate) -> (f64, f64) {
        match which {
            ReportingDate::Previous => (self.confirmed_previous as f64, self.deaths_previous as f64),
            ReportingDate::Current => (self.confirmed_current as f64, self.deaths_current as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Index of the country in `ScatterChart::categories`
    pub color: usize,
    /// Hover text
    pub text: String,
    pub province: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub date: ReportingDate,
    pub visible: bool,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub x_label: String,
    pub y_label: String,
    /// Sorted unique country names; colour codes index into this
    pub categories: Vec<String>,
    pub traces: Vec<ScatterTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionChart {
    pub date: NaiveDate,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub points: Vec<ScatterPoint>,
    pub fit: LinearFit,
    /// Fitted line across the x range, as two endpoints
    pub line: [(f64, f64); 2],
    pub equation: String,
}

const X_LABEL: &str = "Gediagnosticeerde gevallen";
const Y_LABEL: &str = "Sterfgevallen";

/// Bar chart of the three increase percentages of one province
pub fn increase_bar(row: &IncreaseSummary) -> BarChart {
    let metrics = [Metric::Active, Metric::Confirmed, Metric::Deaths];
    BarChart {
        title: format!("{} ({})", row.province, row.country_name),
        labels: metrics.iter().map(|m| m.increase_label().to_string()).collect(),
        values: metrics.iter().map(|m| row.pct(*m)).collect(),
    }
}

/// Bar chart of one metric's increase per country
pub fn country_bar(rows: &[CountryIncrease], metric: Metric) -> BarChart {
    BarChart {
        title: metric.increase_label().to_string(),
        labels: rows.iter().map(|r| r.country_name.clone()).collect(),
        values: rows.iter().map(|r| r.increase_pct).collect(),
    }
}

/// Join records with the confirmed and deaths increase tables
///
/// Rows without a province are dropped for countries that also report named
/// provinces: there the blank row duplicates the provincial rows.
pub fn comparison_points(
    records: &[CaseRecord],
    confirmed: &[IncreaseRow],
    deaths: &[IncreaseRow],
) -> Vec<ComparisonPoint> {
    let confirmed_by_key = index_by_key(confirmed);
    let deaths_by_key = index_by_key(deaths);

    let with_provinces: HashSet<&str> = records
        .iter()
        .filter(|r| !r.province.is_empty())
        .map(|r| r.country_name.as_str())
        .collect();

    let mut points = Vec::new();
    for record in records {
        if record.province.is_empty() && with_provinces.contains(record.country_name.as_str()) {
            continue;
        }
        let (Some(cs), Some(ds)) = (
            confirmed_by_key.get(&record.key()),
            deaths_by_key.get(&record.key()),
        ) else {
            continue;
        };
        for c in cs {
            for d in ds {
                points.push(ComparisonPoint {
                    country_name: record.country_name.clone(),
                    province: record.province.clone(),
                    confirmed_previous: c.previous,
                    confirmed_current: c.current,
                    deaths_previous: d.previous,
                    deaths_current: d.current,
                });
            }
        }
    }
    points
}

/// Sorted unique country names
pub fn categories(points: &[ComparisonPoint]) -> Vec<String> {
    let mut names: Vec<String> = points.iter().map(|p| p.country_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

fn scatter_points(
    points: &[ComparisonPoint],
    categories: &[String],
    which: ReportingDate,
) -> Vec<ScatterPoint> {
    points
        .iter()
        .map(|p| {
            let (x, y) = p.xy(which);
            ScatterPoint {
                x,
                y,
                color: categories
                    .binary_search(&p.country_name)
                    .unwrap_or_default(),
                text: p.country_name.clone(),
                province: p.province.clone(),
            }
        })
        .collect()
}

/// Confirmed-versus-deaths scatter with one trace per reporting date
///
/// The current-date trace starts hidden; the UI toggles between them.
pub fn scatter(points: &[ComparisonPoint], dates: DatePair) -> ScatterChart {
    let categories = categories(points);
    let traces = [ReportingDate::Previous, ReportingDate::Current]
        .into_iter()
        .map(|which| ScatterTrace {
            name: dates.get(which).to_string(),
            date: which,
            visible: which == ReportingDate::Previous,
            points: scatter_points(points, &categories, which),
        })
        .collect();

    ScatterChart {
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        categories,
        traces,
    }
}

/// Deaths regressed on confirmed cases for one reporting date
pub fn regression_overlay(
    points: &[ComparisonPoint],
    dates: DatePair,
    which: ReportingDate,
) -> Result<RegressionChart> {
    let categories = categories(points);
    let scatter = scatter_points(points, &categories, which);

    let xs: Vec<f64> = scatter.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = scatter.iter().map(|p| p.y).collect();
    let fit = LinearFit::fit(&xs, &ys)?;

    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let line = [(min_x, fit.predict(min_x)), (max_x, fit.predict(max_x))];
    let equation = format!(
        "y = {:.6}x {} {:.2} (R² = {:.4})",
        fit.slope,
        if fit.intercept < 0.0 { '-' } else { '+' },
        fit.intercept.abs(),
        fit.r_squared
    );

    Ok(RegressionChart {
        date: dates.get(which),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        categories,
        points: scatter,
        fit,
        line,
        equation,
    })
}
