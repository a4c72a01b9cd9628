//! Base table metadata, data quality, and reload

use axum::{extract::State, Json};
use covdash_common::quality::MissingDataSummary;
use covdash_common::LoadInfo;
use tracing::{info, warn};

use crate::{ApiError, AppState};

/// GET /api/dataset
pub async fn get_dataset_info(State(state): State<AppState>) -> Json<LoadInfo> {
    Json(state.snapshot().await.info.clone())
}

/// GET /api/quality
///
/// Per-column missing-value counts of the raw reports.
pub async fn get_quality(State(state): State<AppState>) -> Json<MissingDataSummary> {
    Json(state.snapshot().await.missing.clone())
}

/// POST /api/reload
///
/// Reloads the base table from the configured source. On failure the
/// previous table stays in place.
pub async fn reload_dataset(State(state): State<AppState>) -> Result<Json<LoadInfo>, ApiError> {
    info!(source = %state.config.source.describe(), "Reloading dataset");

    let dataset = state
        .config
        .source
        .load(state.config.reference_date)
        .await
        .map_err(|e| {
            warn!(error = %e, "Reload failed, keeping previous dataset");
            ApiError::from(e)
        })?;

    let info = dataset.info.clone();
    state.replace(dataset).await;
    Ok(Json(info))
}
