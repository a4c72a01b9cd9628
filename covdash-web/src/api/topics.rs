//! Sidebar topics ("blog categories")

use axum::Json;
use serde::Serialize;

/// One sidebar entry and the API views its page draws
#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub views: &'static [&'static str],
}

pub const TOPICS: &[Topic] = &[
    Topic {
        id: "introductie",
        title: "Introductie",
        views: &["/api/dataset"],
    },
    Topic {
        id: "toename-eu",
        title: "Procentuele Toename van COVID-19 Gevallen en Sterfgevallen in de EU",
        views: &["/api/increase/eu", "/api/provinces"],
    },
    Topic {
        id: "toename",
        title: "Procentuele Toename van COVID-19",
        views: &["/api/countries", "/api/increase", "/api/increase/table"],
    },
    Topic {
        id: "gevallen-vs-sterfgevallen",
        title: "Gediagnosticeerde Gevallen versus Sterfgevallen",
        views: &["/api/charts/scatter", "/api/charts/regression"],
    },
    Topic {
        id: "data-kwaliteit",
        title: "Data kwaliteit",
        views: &["/api/quality"],
    },
];

/// GET /api/topics
pub async fn list_topics() -> Json<&'static [Topic]> {
    Json(TOPICS)
}
