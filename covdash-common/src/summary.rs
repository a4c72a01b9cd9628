//! Province summary table

use std::collections::HashMap;

use serde::Serialize;

use crate::model::CaseRecord;

/// Totals of one (province, country) group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceSummary {
    pub country_name: String,
    pub province: String,
    pub confirmed: i64,
    pub deaths: i64,
    /// Mean of the reported fatality rates; `None` when none were reported
    pub fatality_rate: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    confirmed: i64,
    deaths: i64,
    rate_sum: f64,
    rate_count: usize,
}

/// Group records by (province, country), summing counts and averaging the
/// fatality rate. Sorted by country name, then province.
pub fn province_summary(records: &[CaseRecord]) -> Vec<ProvinceSummary> {
    let mut groups: HashMap<(&str, &str), Accumulator> = HashMap::new();
    for record in records {
        let acc = groups.entry(record.key()).or_default();
        acc.confirmed = acc.confirmed.saturating_add(record.confirmed.unwrap_or(0));
        acc.deaths = acc.deaths.saturating_add(record.deaths.unwrap_or(0));
        if let Some(rate) = record.fatality_rate {
            acc.rate_sum += rate;
            acc.rate_count += 1;
        }
    }

    let mut rows: Vec<ProvinceSummary> = groups
        .into_iter()
        .map(|((province, country_name), acc)| ProvinceSummary {
            country_name: country_name.to_string(),
            province: province.to_string(),
            confirmed: acc.confirmed,
            deaths: acc.deaths,
            fatality_rate: (acc.rate_count > 0).then(|| acc.rate_sum / acc.rate_count as f64),
        })
        .collect();

    rows.sort_by(|a, b| {
        a.country_name
            .cmp(&b.country_name)
            .then_with(|| a.province.cmp(&b.province))
    });
    rows
}
