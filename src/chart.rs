//! Declarative, renderer-agnostic description of the dashboard.
//!
//! [`build_chart_spec`] is the last pure stage of the pipeline; the
//! [`output`](crate::output) module turns its result into HTML.

use serde::Serialize;

use crate::analyzers::ranking::Metric;
use crate::analyzers::types::{Aggregates, TopNRanking};
use crate::error::{DashboardError, Result};
use crate::normalize::ObservationRecord;

pub const TITLE_PREFIX: &str = "Global COVID-19 Cases (Last Updated: ";
pub const SOURCE_ANNOTATION: &str = "Source: https://bit.ly/3aEzxjK";

/// Cell occupied by a panel in the dashboard's 4x6 grid. 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub row: u8,
    pub col: u8,
    pub rowspan: u8,
    pub colspan: u8,
}

impl GridCell {
    const fn at(row: u8, col: u8, rowspan: u8, colspan: u8) -> Self {
        Self {
            row,
            col,
            rowspan,
            colspan,
        }
    }
}

pub const GRID_ROWS: u8 = 4;
pub const GRID_COLS: u8 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Colour-scale value, the observation's confirmed count.
    pub color_value: u64,
    /// Lines separated by `\n`.
    pub hover_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub points: Vec<MapPoint>,
    pub color_min: u64,
    pub color_max: u64,
    pub colorbar_title: String,
    pub cell: GridCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub label: String,
    pub value: u64,
    pub cell: GridCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub color: String,
    pub categories: Vec<String>,
    pub values: Vec<u64>,
    pub cell: GridCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Fixed presentation constants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub template: &'static str,
    pub projection: &'static str,
    pub land_color: &'static str,
    pub lake_color: &'static str,
    pub marker_size: u32,
    pub marker_opacity: f64,
    pub marker_symbol: &'static str,
    pub marker_line_color: &'static str,
    pub marker_line_width: u32,
    pub colorbar_x: f64,
    pub legend_orientation: &'static str,
    pub legend_x: f64,
    pub legend_y: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            template: "plotly_dark",
            projection: "orthographic",
            land_color: "white",
            lake_color: "LightBlue",
            marker_size: 10,
            marker_opacity: 0.8,
            marker_symbol: "square",
            marker_line_color: "rgba(102, 102, 102)",
            marker_line_width: 1,
            colorbar_x: -0.05,
            legend_orientation: "h",
            legend_x: 0.65,
            legend_y: 0.8,
        }
    }
}

/// Everything the renderer needs. Built once per run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub map: MapLayer,
    pub indicators: Vec<Indicator>,
    pub bars: Vec<BarSeries>,
    pub annotation: Annotation,
    pub style: ChartStyle,
}

/// Bar colour for each ranked metric.
pub fn bar_color(metric: Metric) -> &'static str {
    match metric {
        Metric::Confirmed => "Yellow",
        Metric::Recovered => "Green",
        Metric::Deaths => "crimson",
    }
}

/// Formats the map hover text for one observation.
pub fn hover_text(r: &ObservationRecord) -> String {
    format!(
        "{} {}\nConfirmed: {}\nDeaths: {}\nRecovered: {}\nLast updated: {}",
        r.country,
        r.region,
        r.confirmed,
        r.deaths,
        r.recovered,
        r.last_update_display()
    )
}

/// Assembles the dashboard description.
///
/// The title carries the `last_update` of the *first* observation in feed
/// order, not the most recent one.
///
/// # Errors
///
/// Returns [`DashboardError::EmptyDataset`] when `records` is empty.
pub fn build_chart_spec(records: &[ObservationRecord], aggregates: &Aggregates) -> Result<ChartSpec> {
    let first = records.first().ok_or(DashboardError::EmptyDataset)?;
    let title = format!("{TITLE_PREFIX}{})", first.last_update_display());

    let color_max = records.iter().map(|r| r.confirmed).max().unwrap_or(0);
    let points = records
        .iter()
        .map(|r| MapPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            color_value: r.confirmed.min(color_max),
            hover_text: hover_text(r),
        })
        .collect();

    let totals = &aggregates.totals;
    let indicators = vec![
        indicator(Metric::Confirmed, totals.total_confirmed, 4),
        indicator(Metric::Recovered, totals.total_recovered, 5),
        indicator(Metric::Deaths, totals.total_deaths, 6),
    ];

    let bars = vec![
        bar_series(&aggregates.top_confirmed, 2),
        bar_series(&aggregates.top_recovered, 3),
        bar_series(&aggregates.top_deaths, 4),
    ];

    Ok(ChartSpec {
        title,
        map: MapLayer {
            points,
            color_min: 0,
            color_max,
            colorbar_title: "Confirmed Cases\nLatest Update".to_string(),
            cell: GridCell::at(1, 1, GRID_ROWS, 3),
        },
        indicators,
        bars,
        annotation: Annotation {
            text: SOURCE_ANNOTATION.to_string(),
            x: 0.35,
            y: 0.0,
        },
        style: ChartStyle::default(),
    })
}

fn indicator(metric: Metric, value: u64, col: u8) -> Indicator {
    Indicator {
        label: metric.label().to_string(),
        value,
        cell: GridCell::at(1, col, 1, 1),
    }
}

fn bar_series(ranking: &TopNRanking, row: u8) -> BarSeries {
    BarSeries {
        name: ranking.metric.label().to_string(),
        color: bar_color(ranking.metric).to_string(),
        categories: ranking.countries(),
        values: ranking.values(),
        cell: GridCell::at(row, 4, 1, 3),
    }
}
