//! Day-over-day increase tables
//!
//! The source only reports the current cumulative value and its delta, so the
//! prior day's count is reconstructed as `current - diff` and the increase is
//! expressed against it.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::model::{CaseRecord, Metric};

/// One province's increase for a single metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncreaseRow {
    pub country_name: String,
    pub province: String,
    pub diff: i64,
    pub increase_pct: f64,
    /// Reconstructed prior-day count
    pub previous: i64,
    pub current: i64,
}

impl IncreaseRow {
    pub fn key(&self) -> (&str, &str) {
        (&self.province, &self.country_name)
    }
}

/// The three increase percentages of one province, after the merge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncreaseSummary {
    pub country_name: String,
    pub province: String,
    pub active_increase_pct: f64,
    pub confirmed_increase_pct: f64,
    pub deaths_increase_pct: f64,
}

impl IncreaseSummary {
    pub fn pct(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Active => self.active_increase_pct,
            Metric::Confirmed => self.confirmed_increase_pct,
            Metric::Deaths => self.deaths_increase_pct,
        }
    }
}

/// Per-country totals for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryIncrease {
    pub country_name: String,
    pub provinces: usize,
    pub previous: i64,
    pub current: i64,
    pub diff: i64,
    pub increase_pct: f64,
}

/// Percentage change from `previous` to `current`; zero when undefined
pub fn increase_pct(previous: i64, current: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    let pct = (current as f64 - previous as f64) * 100.0 / previous as f64;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Derive the increase table of one metric
///
/// Records lacking the metric or its delta are left out, as are records whose
/// prior-day count does not fit in an `i64`.
pub fn compute_increase(records: &[CaseRecord], metric: Metric) -> Vec<IncreaseRow> {
    records
        .iter()
        .filter_map(|record| {
            let current = metric.current(record)?;
            let diff = metric.diff(record)?;
            let Some(previous) = current.checked_sub(diff) else {
                debug!(
                    country = %record.country_name,
                    province = %record.province,
                    %metric,
                    "Skipping row: prior-day count out of range"
                );
                return None;
            };
            Some(IncreaseRow {
                country_name: record.country_name.clone(),
                province: record.province.clone(),
                diff,
                increase_pct: increase_pct(previous, current),
                previous,
                current,
            })
        })
        .collect()
}

/// Index rows by join key, preserving row order within each key
pub(crate) fn index_by_key(rows: &[IncreaseRow]) -> HashMap<(&str, &str), Vec<&IncreaseRow>> {
    let mut index: HashMap<(&str, &str), Vec<&IncreaseRow>> = HashMap::new();
    for row in rows {
        index.entry(row.key()).or_default().push(row);
    }
    index
}

/// Inner-join the three increase tables on (province, country)
///
/// Output follows the order of `active`; duplicate keys yield every matching
/// combination.
pub fn merge_increases(
    active: &[IncreaseRow],
    confirmed: &[IncreaseRow],
    deaths: &[IncreaseRow],
) -> Vec<IncreaseSummary> {
    let confirmed_by_key = index_by_key(confirmed);
    let deaths_by_key = index_by_key(deaths);

    let mut merged = Vec::new();
    for a in active {
        let (Some(cs), Some(ds)) = (confirmed_by_key.get(&a.key()), deaths_by_key.get(&a.key()))
        else {
            continue;
        };
        for c in cs {
            for d in ds {
                merged.push(IncreaseSummary {
                    country_name: a.country_name.clone(),
                    province: a.province.clone(),
                    active_increase_pct: a.increase_pct,
                    confirmed_increase_pct: c.increase_pct,
                    deaths_increase_pct: d.increase_pct,
                });
            }
        }
    }
    merged
}

/// Build the merged increase table straight from the records
pub fn increase_summary(records: &[CaseRecord]) -> Vec<IncreaseSummary> {
    merge_increases(
        &compute_increase(records, Metric::Active),
        &compute_increase(records, Metric::Confirmed),
        &compute_increase(records, Metric::Deaths),
    )
}

/// Unique country names in order of first appearance
pub fn countries(summary: &[IncreaseSummary]) -> Vec<String> {
    let mut seen = Vec::<&str>::new();
    for row in summary {
        if !seen.contains(&row.country_name.as_str()) {
            seen.push(&row.country_name);
        }
    }
    seen.into_iter().map(str::to_string).collect()
}

/// Unique provinces of one country in order of first appearance
pub fn provinces(summary: &[IncreaseSummary], country_name: &str) -> Vec<String> {
    let mut seen = Vec::<&str>::new();
    for row in summary.iter().filter(|r| r.country_name == country_name) {
        if !seen.contains(&row.province.as_str()) {
            seen.push(&row.province);
        }
    }
    seen.into_iter().map(str::to_string).collect()
}

/// Look up the merged row of one province
pub fn find<'a>(
    summary: &'a [IncreaseSummary],
    country_name: &str,
    province: &str,
) -> Option<&'a IncreaseSummary> {
    summary
        .iter()
        .find(|r| r.country_name == country_name && r.province == province)
}

/// Aggregate one metric per country, sorted by country name
pub fn country_increase(records: &[CaseRecord], metric: Metric) -> Vec<CountryIncrease> {
    let mut totals: BTreeMap<String, Option<(usize, i64, i64)>> = BTreeMap::new();
    for row in compute_increase(records, metric) {
        let entry = totals.entry(row.country_name).or_insert(Some((0, 0, 0)));
        // An overflowing total poisons the whole country
        *entry = entry.and_then(|(provinces, current, diff)| {
            Some((
                provinces + 1,
                current.checked_add(row.current)?,
                diff.checked_add(row.diff)?,
            ))
        });
    }

    totals
        .into_iter()
        .filter_map(|(country_name, totals)| {
            let Some((provinces, current, diff)) = totals else {
                debug!(country = %country_name, %metric, "Skipping country: totals out of range");
                return None;
            };
            let previous = current.checked_sub(diff)?;
            Some(CountryIncrease {
                country_name,
                provinces,
                previous,
                current,
                diff,
                increase_pct: increase_pct(previous, current),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, province: &str, confirmed: (i64, i64), deaths: (i64, i64), active: Option<(i64, i64)>) -> CaseRecord {
        CaseRecord {
            country: String::new(),
            country_name: country.to_string(),
            province: province.to_string(),
            date: None,
            confirmed: Some(confirmed.0),
            confirmed_diff: Some(confirmed.1),
            deaths: Some(deaths.0),
            deaths_diff: Some(deaths.1),
            active: active.map(|a| a.0),
            active_diff: active.map(|a| a.1),
            fatality_rate: None,
        }
    }

    #[test]
    fn test_increase_pct_basic() {
        assert_eq!(increase_pct(100, 110), 10.0);
        assert_eq!(increase_pct(200, 150), -25.0);
    }

    #[test]
    fn test_increase_pct_zero_previous_is_zero() {
        assert_eq!(increase_pct(0, 0), 0.0);
        assert_eq!(increase_pct(0, 5), 0.0);
    }

    #[test]
    fn test_compute_increase_reconstructs_previous() {
        let records = vec![record("Nederland", "Drenthe", (110, 10), (5, 0), Some((20, 4)))];
        let rows = compute_increase(&records, Metric::Confirmed);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].previous, 100);
        assert_eq!(rows[0].current, 110);
        assert_eq!(rows[0].increase_pct, 10.0);

        let active = compute_increase(&records, Metric::Active);
        assert_eq!(active[0].previous, 16);
        assert_eq!(active[0].increase_pct, 25.0);
    }

    #[test]
    fn test_compute_increase_zero_prior_day() {
        // All cases arrived today: prior-day count reconstructs to zero
        let records = vec![record("Malta", "", (7, 7), (0, 0), Some((7, 7)))];
        let rows = compute_increase(&records, Metric::Confirmed);
        assert_eq!(rows[0].previous, 0);
        assert_eq!(rows[0].increase_pct, 0.0);
    }

    #[test]
    fn test_increase_pct_extreme_counts_stay_finite() {
        assert_eq!(increase_pct(i64::MIN, i64::MAX), -200.0);
        assert!(increase_pct(1, i64::MAX).is_finite());
    }

    #[test]
    fn test_compute_increase_skips_out_of_range_prior_day() {
        let records = vec![
            record("Nederland", "Drenthe", (9_000_000_000_000_000_000, -9_000_000_000_000_000_000), (5, 0), Some((1, 0))),
            record("Nederland", "Zeeland", (110, 10), (5, 0), Some((1, 0))),
        ];
        let rows = compute_increase(&records, Metric::Confirmed);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].province, "Zeeland");

        // Deaths are in range for both rows
        assert_eq!(compute_increase(&records, Metric::Deaths).len(), 2);
        assert_eq!(increase_summary(&records).len(), 1);
    }

    #[test]
    fn test_country_increase_skips_overflowing_totals() {
        let records = vec![
            record("Nederland", "Drenthe", (i64::MAX, 0), (1, 0), None),
            record("Nederland", "Zeeland", (i64::MAX, 0), (1, 0), None),
            record("België", "Antwerpen", (100, 10), (1, 0), None),
        ];
        let rows = country_increase(&records, Metric::Confirmed);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country_name, "België");

        // Deaths totals are small, so both countries appear
        assert_eq!(country_increase(&records, Metric::Deaths).len(), 2);
    }

    #[test]
    fn test_compute_increase_skips_missing() {
        let records = vec![record("Nederland", "Drenthe", (110, 10), (5, 0), None)];
        assert!(compute_increase(&records, Metric::Active).is_empty());
    }

    #[test]
    fn test_merge_contains_exactly_common_keys() {
        let records = vec![
            record("Nederland", "Drenthe", (110, 10), (5, 0), Some((20, 4))),
            record("Nederland", "Zeeland", (50, 0), (1, 0), None),
            record("België", "Antwerpen", (300, 30), (10, 1), Some((40, -2))),
        ];
        let active = compute_increase(&records, Metric::Active);
        let confirmed = compute_increase(&records, Metric::Confirmed);
        let deaths = compute_increase(&records, Metric::Deaths);
        let merged = merge_increases(&active, &confirmed, &deaths);

        let keys: Vec<(&str, &str)> = merged
            .iter()
            .map(|r| (r.province.as_str(), r.country_name.as_str()))
            .collect();
        assert_eq!(keys, vec![("Drenthe", "Nederland"), ("Antwerpen", "België")]);
        for key in &keys {
            assert!(active.iter().any(|r| r.key() == *key));
            assert!(confirmed.iter().any(|r| r.key() == *key));
            assert!(deaths.iter().any(|r| r.key() == *key));
        }
    }

    #[test]
    fn test_merge_carries_each_metric() {
        let records = vec![record("Nederland", "Drenthe", (110, 10), (5, 1), Some((20, 4)))];
        let merged = increase_summary(&records);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].confirmed_increase_pct, 10.0);
        assert_eq!(merged[0].deaths_increase_pct, 25.0);
        assert_eq!(merged[0].active_increase_pct, 25.0);
        assert_eq!(merged[0].pct(Metric::Deaths), 25.0);
    }

    #[test]
    fn test_merge_duplicate_keys_cross_product() {
        let records = vec![
            record("Nederland", "Drenthe", (110, 10), (5, 1), Some((20, 4))),
            record("Nederland", "Drenthe", (220, 20), (5, 1), Some((20, 4))),
        ];
        let merged = increase_summary(&records);
        assert_eq!(merged.len(), 8);
    }

    #[test]
    fn test_selectors_preserve_first_appearance() {
        let records = vec![
            record("Spanje", "Madrid", (1, 0), (1, 0), Some((1, 0))),
            record("België", "Antwerpen", (1, 0), (1, 0), Some((1, 0))),
            record("Spanje", "Andalusia", (1, 0), (1, 0), Some((1, 0))),
        ];
        let merged = increase_summary(&records);
        assert_eq!(countries(&merged), vec!["Spanje", "België"]);
        assert_eq!(provinces(&merged, "Spanje"), vec!["Madrid", "Andalusia"]);
        assert!(provinces(&merged, "Zweden").is_empty());
        assert!(find(&merged, "Spanje", "Andalusia").is_some());
        assert!(find(&merged, "Spanje", "Antwerpen").is_none());
    }

    #[test]
    fn test_country_increase_totals() {
        let records = vec![
            record("Nederland", "Drenthe", (110, 10), (5, 0), None),
            record("Nederland", "Zeeland", (90, 10), (5, 0), None),
            record("België", "Antwerpen", (0, 0), (0, 0), None),
        ];
        let rows = country_increase(&records, Metric::Confirmed);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country_name, "België");
        assert_eq!(rows[0].increase_pct, 0.0);
        assert_eq!(rows[1].provinces, 2);
        assert_eq!(rows[1].previous, 180);
        assert_eq!(rows[1].current, 200);
        assert!((rows[1].increase_pct - 11.111111).abs() < 1e-4);
    }
}
