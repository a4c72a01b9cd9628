//! Province summary table

use std::time::Instant;

use axum::{extract::State, Json};
use covdash_common::summary::{province_summary, ProvinceSummary};

use super::log_elapsed;
use crate::extract::ApiQuery;
use crate::pagination::{paginate, Page, PageQuery};
use crate::AppState;

/// GET /api/provinces?page=
///
/// Confirmed and death totals with mean fatality rate per province, sorted by
/// country.
pub async fn get_province_summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Json<Page<ProvinceSummary>> {
    let started = Instant::now();
    let dataset = state.snapshot().await;
    let page = paginate(province_summary(&dataset.records), query.page);
    log_elapsed("province_summary", started);
    Json(page)
}
