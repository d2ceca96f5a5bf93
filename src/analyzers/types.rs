//! Data types produced by the aggregation stage.

use serde::Serialize;

/// Summed counts for one country, across all of its observation rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryAggregate {
    pub country: String,
    pub confirmed_total: u64,
    pub deaths_total: u64,
    pub recovered_total: u64,
}

/// Row-level sums across every observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlobalTotals {
    pub total_confirmed: u64,
    pub total_recovered: u64,
    pub total_deaths: u64,
}

/// One labelled value in a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub country: String,
    pub value: u64,
}

/// The highest values of one metric, descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopNRanking {
    pub metric: super::ranking::Metric,
    pub entries: Vec<RankedEntry>,
}

impl TopNRanking {
    pub fn countries(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.country.clone()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.value).collect()
    }
}

/// All aggregates for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub countries: Vec<CountryAggregate>,
    pub totals: GlobalTotals,
    pub top_confirmed: TopNRanking,
    pub top_recovered: TopNRanking,
    pub top_deaths: TopNRanking,
}
