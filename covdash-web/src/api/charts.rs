//! Confirmed-versus-deaths charts

use std::time::Instant;

use axum::{extract::State, Json};
use serde::Deserialize;

use covdash_common::charts::{
    comparison_points, regression_overlay, scatter, ComparisonPoint, RegressionChart,
    ReportingDate, ScatterChart,
};
use covdash_common::increase::compute_increase;
use covdash_common::{Dataset, Metric};

use super::log_elapsed;
use crate::extract::ApiQuery;
use crate::{ApiError, AppState};

/// Query parameters for the regression overlay
#[derive(Debug, Default, Deserialize)]
pub struct RegressionQuery {
    #[serde(default)]
    pub date: ReportingDate,
}

fn points(dataset: &Dataset) -> Vec<ComparisonPoint> {
    comparison_points(
        &dataset.records,
        &compute_increase(&dataset.records, Metric::Confirmed),
        &compute_increase(&dataset.records, Metric::Deaths),
    )
}

/// GET /api/charts/scatter
///
/// Both reporting dates as separate traces; the UI switches between them.
pub async fn get_scatter(State(state): State<AppState>) -> Json<ScatterChart> {
    let started = Instant::now();
    let dataset = state.snapshot().await;
    let chart = scatter(&points(&dataset), dataset.info.dates());
    log_elapsed("scatter", started);
    Json(chart)
}

/// GET /api/charts/regression?date=previous|current
pub async fn get_regression(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RegressionQuery>,
) -> Result<Json<RegressionChart>, ApiError> {
    let started = Instant::now();
    let dataset = state.snapshot().await;
    let chart = regression_overlay(&points(&dataset), dataset.info.dates(), query.date)?;
    log_elapsed("regression", started);
    Ok(Json(chart))
}
