//! HTTP API handlers for covdash-web

pub mod buildinfo;
pub mod charts;
pub mod dataset;
pub mod health;
pub mod increase;
pub mod provinces;
pub mod selectors;
pub mod topics;
pub mod ui;

pub use buildinfo::get_build_info;
pub use charts::{get_regression, get_scatter};
pub use dataset::{get_dataset_info, get_quality, reload_dataset};
pub use health::health_routes;
pub use increase::{get_eu_increase, get_increase, get_increase_table};
pub use provinces::get_province_summary;
pub use selectors::{list_countries, list_provinces};
pub use topics::list_topics;
pub use ui::{serve_app_css, serve_app_js, serve_index};

use std::time::Instant;

/// Log how long a view took to derive from the base table
pub(crate) fn log_elapsed(view: &'static str, started: Instant) {
    tracing::debug!(
        view,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Derived view"
    );
}
