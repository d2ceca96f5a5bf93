use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::ranking::{Metric, top_n};
use crate::analyzers::types::{Aggregates, CountryAggregate, GlobalTotals};
use crate::normalize::ObservationRecord;

/// Sums counts per country, ordered by country name. Sums saturate at `u64::MAX`.
///
/// Grouping is on the exact `country` string (case-sensitive, untrimmed).
pub fn aggregate_by_country(records: &[ObservationRecord]) -> Vec<CountryAggregate> {
    let mut groups: BTreeMap<&str, CountryAggregate> = BTreeMap::new();

    for r in records {
        let entry = groups
            .entry(r.country.as_str())
            .or_insert_with(|| CountryAggregate {
                country: r.country.clone(),
                confirmed_total: 0,
                deaths_total: 0,
                recovered_total: 0,
            });
        entry.confirmed_total = entry.confirmed_total.saturating_add(r.confirmed);
        entry.deaths_total = entry.deaths_total.saturating_add(r.deaths);
        entry.recovered_total = entry.recovered_total.saturating_add(r.recovered);
    }

    groups.into_values().collect()
}

/// Sums counts over every observation row, saturating at `u64::MAX`.
///
/// Province rows each contribute, so this equals the sum of the per-country
/// aggregates but is computed from the rows directly.
pub fn global_totals(records: &[ObservationRecord]) -> GlobalTotals {
    records.iter().fold(GlobalTotals::default(), |mut t, r| {
        t.total_confirmed = t.total_confirmed.saturating_add(r.confirmed);
        t.total_recovered = t.total_recovered.saturating_add(r.recovered);
        t.total_deaths = t.total_deaths.saturating_add(r.deaths);
        t
    })
}

/// Computes the country grouping, global totals and the three rankings.
pub fn aggregate(records: &[ObservationRecord], n: usize) -> Aggregates {
    let aggregates = Aggregates {
        countries: aggregate_by_country(records),
        totals: global_totals(records),
        top_confirmed: top_n(records, Metric::Confirmed, n),
        top_recovered: top_n(records, Metric::Recovered, n),
        top_deaths: top_n(records, Metric::Deaths, n),
    };

    debug!(
        rows = records.len(),
        countries = aggregates.countries.len(),
        total_confirmed = aggregates.totals.total_confirmed,
        "Aggregation complete"
    );

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::convert_epoch_millis;
    use chrono::{Offset, Utc};

    fn obs(country: &str, region: &str, confirmed: u64, deaths: u64, recovered: u64) -> ObservationRecord {
        ObservationRecord {
            country: country.to_string(),
            region: region.to_string(),
            latitude: None,
            longitude: None,
            confirmed,
            deaths,
            recovered,
            last_update: convert_epoch_millis(0, Utc.fix()).unwrap(),
        }
    }

    fn sample() -> Vec<ObservationRecord> {
        vec![
            obs("US", "Washington", 100, 10, 1),
            obs("Italy", "", 500, 50, 40),
            obs("US", "New York", 300, 5, 0),
            obs("us", "", 1, 0, 0),
        ]
    }

    #[test]
    fn test_aggregate_by_country_sums_rows() {
        let records = sample();
        let countries = aggregate_by_country(&records);

        for c in &countries {
            let expected: u64 = records
                .iter()
                .filter(|r| r.country == c.country)
                .map(|r| r.confirmed)
                .sum();
            assert_eq!(c.confirmed_total, expected);
        }

        let us = countries.iter().find(|c| c.country == "US").unwrap();
        assert_eq!(us.confirmed_total, 400);
        assert_eq!(us.deaths_total, 15);
        assert_eq!(us.recovered_total, 1);
    }

    #[test]
    fn test_aggregate_by_country_is_case_sensitive_and_sorted() {
        let names: Vec<_> = aggregate_by_country(&sample())
            .into_iter()
            .map(|c| c.country)
            .collect();

        assert_eq!(names, vec!["Italy", "US", "us"]);
    }

    #[test]
    fn test_global_totals_are_row_level() {
        let records = sample();
        let totals = global_totals(&records);

        assert_eq!(totals.total_confirmed, records.iter().map(|r| r.confirmed).sum::<u64>());
        assert_eq!(totals.total_confirmed, 901);
        assert_eq!(totals.total_deaths, 65);
        assert_eq!(totals.total_recovered, 41);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let aggregates = aggregate(&[], 10);

        assert!(aggregates.countries.is_empty());
        assert_eq!(aggregates.totals, GlobalTotals::default());
        assert!(aggregates.top_confirmed.entries.is_empty());
        assert!(aggregates.top_recovered.entries.is_empty());
        assert!(aggregates.top_deaths.entries.is_empty());
    }

    #[test]
    fn test_aggregate_rankings_use_rows() {
        let aggregates = aggregate(&sample(), 2);

        assert_eq!(aggregates.top_confirmed.countries(), vec!["Italy", "US"]);
        assert_eq!(aggregates.top_confirmed.values(), vec![500, 300]);
        assert_eq!(aggregates.top_deaths.values(), vec![50, 10]);
    }

    #[test]
    fn test_sums_saturate_instead_of_overflowing() {
        let records = vec![obs("A", "", u64::MAX, 1, 0), obs("A", "X", 1, u64::MAX, 0)];

        let countries = aggregate_by_country(&records);
        assert_eq!(countries[0].confirmed_total, u64::MAX);
        assert_eq!(countries[0].deaths_total, u64::MAX);

        let totals = global_totals(&records);
        assert_eq!(totals.total_confirmed, u64::MAX);
        assert_eq!(totals.total_deaths, u64::MAX);
        assert_eq!(totals.total_recovered, 0);
    }
}
