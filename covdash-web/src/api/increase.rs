//! Increase percentage views
//!
//! The country/province selection replaces the dashboard dropdowns: an
//! omitted country selects the first one, an omitted province the first
//! province of that country.

use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use covdash_common::charts::{country_bar, increase_bar, BarChart};
use covdash_common::increase::{
    country_increase, countries, find, increase_summary, provinces, CountryIncrease,
    IncreaseSummary,
};
use covdash_common::Metric;

use super::log_elapsed;
use crate::extract::ApiQuery;
use crate::pagination::{paginate, Page, PageQuery};
use crate::{ApiError, AppState};

/// Query parameters for the province increase view
#[derive(Debug, Default, Deserialize)]
pub struct IncreaseQuery {
    pub country: Option<String>,
    pub province: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IncreaseResponse {
    pub country: String,
    pub province: String,
    pub row: IncreaseSummary,
    pub chart: BarChart,
}

/// Query parameters for the EU overview
#[derive(Debug, Deserialize)]
pub struct EuQuery {
    #[serde(default = "default_metric")]
    pub metric: Metric,
}

fn default_metric() -> Metric {
    Metric::Confirmed
}

#[derive(Debug, Serialize)]
pub struct EuIncreaseResponse {
    pub metric: Metric,
    pub rows: Vec<CountryIncrease>,
    pub chart: BarChart,
}

/// GET /api/increase?country=&province=
///
/// Merged increase row of one province plus its bar chart.
pub async fn get_increase(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IncreaseQuery>,
) -> Result<Json<IncreaseResponse>, ApiError> {
    let started = Instant::now();
    let dataset = state.snapshot().await;
    let summary = increase_summary(&dataset.records);

    let requested_country = non_empty(query.country);
    let requested_province = non_empty(query.province);
    if requested_country.is_none() && requested_province.is_some() {
        return Err(ApiError::BadRequest(
            "province requires a country".to_string(),
        ));
    }

    let country = match requested_country {
        Some(country) => country,
        None => countries(&summary)
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("No countries in dataset".to_string()))?,
    };

    let province = match requested_province {
        Some(province) => province,
        None => provinces(&summary, &country)
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("Unknown country: {}", country)))?,
    };

    let row = find(&summary, &country, &province)
        .cloned()
        .ok_or_else(|| {
            ApiError::NotFound(format!("No increase data for {} ({})", province, country))
        })?;
    let chart = increase_bar(&row);

    log_elapsed("increase", started);
    Ok(Json(IncreaseResponse {
        country,
        province,
        row,
        chart,
    }))
}

// Empty dropdown values mean "not selected"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// GET /api/increase/table?page=
pub async fn get_increase_table(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Json<Page<IncreaseSummary>> {
    let started = Instant::now();
    let dataset = state.snapshot().await;
    let page = paginate(increase_summary(&dataset.records), query.page);
    log_elapsed("increase_table", started);
    Json(page)
}

/// GET /api/increase/eu?metric=
///
/// Per-country increase of one metric, summed over provinces.
pub async fn get_eu_increase(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EuQuery>,
) -> Json<EuIncreaseResponse> {
    let started = Instant::now();
    let dataset = state.snapshot().await;
    let rows = country_increase(&dataset.records, query.metric);
    let chart = country_bar(&rows, query.metric);
    log_elapsed("eu_increase", started);

    Json(EuIncreaseResponse {
        metric: query.metric,
        rows,
        chart,
    })
}
