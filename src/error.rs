//! Error type shared by every stage of the dashboard pipeline.

use thiserror::Error;

/// Errors that abort a dashboard run. None of them are recovered from.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Transport failure or non-success status while fetching the feed.
    #[error("feed fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The feed URL could not be parsed.
    #[error("invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The response body lacks the expected `features` list structure.
    #[error("malformed feed: {0}")]
    MalformedFeed(String),

    /// No observation survived normalization, so there is nothing to chart.
    #[error("dataset is empty after filtering; no dashboard can be built")]
    EmptyDataset,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
