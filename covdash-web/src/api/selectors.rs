//! Country and province selector values

use axum::{extract::State, Json};
use serde::Serialize;

use covdash_common::increase::{countries, increase_summary, provinces};

use crate::extract::ApiPath;
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProvincesResponse {
    pub country: String,
    pub provinces: Vec<String>,
}

/// GET /api/countries
///
/// Countries present in the merged increase table, in first-appearance order.
pub async fn list_countries(State(state): State<AppState>) -> Json<CountriesResponse> {
    let dataset = state.snapshot().await;
    let summary = increase_summary(&dataset.records);
    Json(CountriesResponse {
        countries: countries(&summary),
    })
}

/// GET /api/countries/:country/provinces
pub async fn list_provinces(
    State(state): State<AppState>,
    ApiPath(country): ApiPath<String>,
) -> Result<Json<ProvincesResponse>, ApiError> {
    let dataset = state.snapshot().await;
    let summary = increase_summary(&dataset.records);

    let provinces = provinces(&summary, &country);
    if provinces.is_empty() {
        return Err(ApiError::NotFound(format!("Unknown country: {}", country)));
    }

    Ok(Json(ProvincesResponse { country, provinces }))
}
