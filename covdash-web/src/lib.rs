//! covdash-web library - EU COVID-19 increase dashboard service
//!
//! The base table is loaded once and cached in `AppState`; each request
//! recomputes the derived tables it needs from that snapshot.

use std::sync::Arc;

use axum::Router;
use covdash_common::config::DashboardConfig;
use covdash_common::Dataset;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod extract;
pub mod pagination;

pub use error::ApiError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Cached base table; replaced as a whole on reload
    dataset: Arc<RwLock<Arc<Dataset>>>,
    /// Resolved configuration (source to reload from)
    pub config: Arc<DashboardConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(Arc::new(dataset))),
            config: Arc::new(config),
        }
    }

    /// Current base table; the lock is released before the caller computes
    pub async fn snapshot(&self) -> Arc<Dataset> {
        self.dataset.read().await.clone()
    }

    /// Swap in a freshly loaded base table
    pub async fn replace(&self, dataset: Dataset) {
        *self.dataset.write().await = Arc::new(dataset);
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/topics", get(api::list_topics))
        .route("/api/dataset", get(api::get_dataset_info))
        .route("/api/quality", get(api::get_quality))
        .route("/api/reload", post(api::reload_dataset))
        .route("/api/countries", get(api::list_countries))
        .route("/api/countries/:country/provinces", get(api::list_provinces))
        .route("/api/increase", get(api::get_increase))
        .route("/api/increase/table", get(api::get_increase_table))
        .route("/api/increase/eu", get(api::get_eu_increase))
        .route("/api/provinces", get(api::get_province_summary))
        .route("/api/charts/scatter", get(api::get_scatter))
        .route("/api/charts/regression", get(api::get_regression));

    let ui = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/app.css", get(api::serve_app_css))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(ui)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
