//! Summary aggregates over normalized observations.
//!
//! Per-country grouping, row-level global totals, and per-metric top-N
//! rankings. Each is computed independently over the full observation list.

pub mod aggregate;
pub mod ranking;
pub mod types;
