use serde::Serialize;

use crate::analyzers::types::{RankedEntry, TopNRanking};
use crate::normalize::ObservationRecord;

/// A count that observations can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Confirmed,
    Recovered,
    Deaths,
}

impl Metric {
    pub fn value(self, record: &ObservationRecord) -> u64 {
        match self {
            Metric::Confirmed => record.confirmed,
            Metric::Recovered => record.recovered,
            Metric::Deaths => record.deaths,
        }
    }

    /// Display label used for indicators and bar series.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed Cases",
            Metric::Recovered => "Recovered Cases",
            Metric::Deaths => "Deaths Cases",
        }
    }
}

/// Ranks observation rows by `metric`, highest first, keeping the first `n`.
///
/// Ties keep feed order. Rows are not merged per country, so a country with
/// several regions can appear more than once.
pub fn top_n(records: &[ObservationRecord], metric: Metric, n: usize) -> TopNRanking {
    let mut sorted: Vec<&ObservationRecord> = records.iter().collect();
    // `sort_by` is stable
    sorted.sort_by(|a, b| metric.value(b).cmp(&metric.value(a)));

    let entries = sorted
        .into_iter()
        .take(n)
        .map(|r| RankedEntry {
            country: r.country.clone(),
            value: metric.value(r),
        })
        .collect();

    TopNRanking { metric, entries }
}
