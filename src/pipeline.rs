//! Wires the stages together: parse, normalize, aggregate, build.
//!
//! Each stage consumes the previous stage's output by reference and returns a
//! new value; nothing is mutated in place.

use tracing::info;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::Aggregates;
use crate::chart::{ChartSpec, build_chart_spec};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::normalize::{ObservationRecord, normalize_records};
use crate::parser::parse_feed;

/// Normalized observations and their aggregates for one run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Number of records the feed contained before filtering.
    pub feed_records: usize,
    pub observations: Vec<ObservationRecord>,
    pub aggregates: Aggregates,
}

impl Analysis {
    /// Parses a raw feed body and runs normalization and aggregation.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::MalformedFeed`](crate::error::DashboardError::MalformedFeed)
    /// if the body does not have the expected shape. An empty dataset is not
    /// an error at this stage.
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn from_feed_bytes(bytes: &[u8], config: &DashboardConfig) -> Result<Self> {
        let raw = parse_feed(bytes)?;
        let observations = normalize_records(&raw, config.utc_offset);
        let aggregates = aggregate(&observations, config.top_n);

        info!(
            feed_records = raw.len(),
            observations = observations.len(),
            countries = aggregates.countries.len(),
            "Feed analyzed"
        );

        Ok(Self {
            feed_records: raw.len(),
            observations,
            aggregates,
        })
    }

    /// Builds the dashboard description.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::EmptyDataset`](crate::error::DashboardError::EmptyDataset)
    /// when no observation survived normalization.
    pub fn chart_spec(&self) -> Result<ChartSpec> {
        build_chart_spec(&self.observations, &self.aggregates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    #[test]
    fn test_empty_feed_analyzes_but_cannot_chart() {
        let analysis =
            Analysis::from_feed_bytes(br#"{"features": []}"#, &DashboardConfig::default()).unwrap();

        assert_eq!(analysis.feed_records, 0);
        assert!(analysis.observations.is_empty());
        assert_eq!(analysis.aggregates.totals.total_confirmed, 0);
        assert!(matches!(analysis.chart_spec(), Err(DashboardError::EmptyDataset)));
    }

    #[test]
    fn test_all_records_filtered_is_empty_dataset() {
        let body = br#"{"features": [{"attributes": {"Country_Region": "A", "Last_Update": null}}]}"#;
        let analysis = Analysis::from_feed_bytes(body, &DashboardConfig::default()).unwrap();

        assert_eq!(analysis.feed_records, 1);
        assert!(matches!(analysis.chart_spec(), Err(DashboardError::EmptyDataset)));
    }

    #[test]
    fn test_top_n_comes_from_config() {
        let body = br#"{"features": [
            {"attributes": {"Country_Region": "A", "Confirmed": 1, "Last_Update": 0}},
            {"attributes": {"Country_Region": "B", "Confirmed": 2, "Last_Update": 0}},
            {"attributes": {"Country_Region": "C", "Confirmed": 3, "Last_Update": 0}}
        ]}"#;
        let config = DashboardConfig {
            top_n: 2,
            ..DashboardConfig::default()
        };
        let analysis = Analysis::from_feed_bytes(body, &config).unwrap();

        assert_eq!(analysis.aggregates.top_confirmed.countries(), vec!["C", "B"]);
    }

    #[test]
    fn test_malformed_feed_propagates() {
        let result = Analysis::from_feed_bytes(br#"{"rows": []}"#, &DashboardConfig::default());
        assert!(matches!(result, Err(DashboardError::MalformedFeed(_))));
    }

    #[test]
    fn test_huge_counts_saturate_totals() {
        let body = br#"{"features": [
            {"attributes": {"Country_Region": "A", "Confirmed": 18446744073709551615, "Last_Update": 0}},
            {"attributes": {"Country_Region": "A", "Confirmed": 1, "Last_Update": 0}}
        ]}"#;
        let analysis = Analysis::from_feed_bytes(body, &DashboardConfig::default()).unwrap();

        assert_eq!(analysis.aggregates.totals.total_confirmed, u64::MAX);
        assert_eq!(analysis.aggregates.countries[0].confirmed_total, u64::MAX);
        assert_eq!(analysis.chart_spec().unwrap().map.color_max, u64::MAX);
    }
}
