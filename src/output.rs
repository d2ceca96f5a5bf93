//! Rendering and persistence of the dashboard.
//!
//! The chart spec is translated into a Plotly figure and written as a single
//! HTML page. Country aggregates can also be exported as CSV.

use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::analyzers::types::CountryAggregate;
use crate::chart::{ChartSpec, GRID_COLS, GRID_ROWS, GridCell};
use crate::error::Result;

/// Plotly bundle referenced by the generated page.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const HORIZONTAL_SPACING: f64 = 0.2 / GRID_COLS as f64;
const VERTICAL_SPACING: f64 = 0.3 / GRID_ROWS as f64;

/// Logs the chart spec as pretty-printed JSON.
pub fn print_json(spec: &ChartSpec) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(spec)?);
    Ok(())
}

/// Paper-coordinate `(x, y)` domains of a grid cell, row 1 at the top.
pub fn cell_domain(cell: GridCell) -> ([f64; 2], [f64; 2]) {
    // Zero rows, columns or spans are treated as 1.
    let span = |start: u8, len: u8, count: u8, spacing: f64| {
        let count = count.max(1);
        let size = (1.0 - spacing * f64::from(count - 1)) / f64::from(count);
        let lo = f64::from(start.saturating_sub(1)) * (size + spacing);
        let hi = lo + f64::from(len.max(1)) * size + f64::from(len.saturating_sub(1)) * spacing;
        (lo.min(1.0), hi.min(1.0))
    };

    let (x0, x1) = span(cell.col, cell.colspan, GRID_COLS, HORIZONTAL_SPACING);
    let (top, bottom) = span(cell.row, cell.rowspan, GRID_ROWS, VERTICAL_SPACING);
    ([x0, x1], [(1.0 - bottom).max(0.0), 1.0 - top])
}

/// Builds the Plotly figure (`data` + `layout`) for a chart spec.
pub fn to_plotly_figure(spec: &ChartSpec) -> Value {
    let style = &spec.style;
    let mut data = Vec::new();

    let map = &spec.map;
    data.push(json!({
        "type": "scattergeo",
        "geo": "geo",
        "locationmode": "country names",
        "lat": map.points.iter().map(|p| p.latitude).collect::<Vec<_>>(),
        "lon": map.points.iter().map(|p| p.longitude).collect::<Vec<_>>(),
        "hovertext": map.points.iter().map(|p| to_html_lines(&p.hover_text)).collect::<Vec<_>>(),
        "showlegend": false,
        "marker": {
            "size": style.marker_size,
            "opacity": style.marker_opacity,
            "reversescale": true,
            "autocolorscale": true,
            "symbol": style.marker_symbol,
            "line": { "width": style.marker_line_width, "color": style.marker_line_color },
            "cmin": map.color_min,
            "cmax": map.color_max,
            "color": map.points.iter().map(|p| p.color_value).collect::<Vec<_>>(),
            "colorbar": {
                "title": { "text": to_html_lines(&map.colorbar_title) },
                "x": style.colorbar_x,
            },
        },
    }));

    for indicator in &spec.indicators {
        let (x, y) = cell_domain(indicator.cell);
        data.push(json!({
            "type": "indicator",
            "mode": "number",
            "value": indicator.value,
            "title": { "text": indicator.label },
            "domain": { "x": x, "y": y },
        }));
    }

    let (geo_x, geo_y) = cell_domain(map.cell);
    let mut layout = json!({
        "title": { "text": spec.title },
        "showlegend": true,
        "legend": {
            "orientation": style.legend_orientation,
            "x": style.legend_x,
            "y": style.legend_y,
        },
        "geo": {
            "domain": { "x": geo_x, "y": geo_y },
            "projection": { "type": style.projection },
            "showcoastlines": true,
            "showland": true,
            "showocean": true,
            "landcolor": style.land_color,
            "lakecolor": style.lake_color,
        },
        "annotations": [{
            "text": spec.annotation.text,
            "showarrow": false,
            "xref": "paper",
            "yref": "paper",
            "x": spec.annotation.x,
            "y": spec.annotation.y,
        }],
    });
    apply_template(&mut layout, style.template);

    for (i, bar) in spec.bars.iter().enumerate() {
        let suffix = if i == 0 { String::new() } else { (i + 1).to_string() };
        let (x, y) = cell_domain(bar.cell);

        data.push(json!({
            "type": "bar",
            "name": bar.name,
            "x": bar.categories,
            "y": bar.values,
            "marker": { "color": bar.color },
            "showlegend": true,
            "xaxis": format!("x{suffix}"),
            "yaxis": format!("y{suffix}"),
        }));
        layout[format!("xaxis{suffix}")] = json!({ "domain": x, "anchor": format!("y{suffix}") });
        layout[format!("yaxis{suffix}")] = json!({ "domain": y, "anchor": format!("x{suffix}") });
    }

    json!({ "data": data, "layout": layout })
}

/// Renders the chart spec to a standalone HTML page.
pub fn render_html(spec: &ChartSpec) -> Result<String> {
    let figure = serde_json::to_string(&to_plotly_figure(spec))?;
    // Keep the payload from closing the script element early.
    let figure = figure.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
<style>html, body, #dashboard {{ margin: 0; width: 100%; height: 100%; background: #111111; }}</style>
</head>
<body>
<div id="dashboard"></div>
<script>
var figure = {figure};
Plotly.newPlot("dashboard", figure.data, figure.layout, {{"responsive": true}});
</script>
</body>
</html>
"#,
        title = escape_html(&spec.title),
    ))
}

/// Renders the chart spec and writes it to `path`, replacing any existing file.
pub fn write_html(path: &str, spec: &ChartSpec) -> Result<()> {
    let html = render_html(spec)?;
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, &html)?;
    info!(path, bytes = html.len(), "Dashboard written");
    Ok(())
}

/// Writes per-country aggregates to a CSV file with a header row.
pub fn write_country_csv(path: &str, countries: &[CountryAggregate]) -> Result<()> {
    debug!(path, rows = countries.len(), "Writing country CSV");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for country in countries {
        writer.serialize(country)?;
    }
    writer.flush()?;

    Ok(())
}

/// plotly.js has no named templates, so the dark one is inlined.
fn apply_template(layout: &mut Value, template: &str) {
    if template == "plotly_dark" {
        layout["template"] = json!({
            "layout": {
                "paper_bgcolor": "rgb(17,17,17)",
                "plot_bgcolor": "rgb(17,17,17)",
                "font": { "color": "#f2f5fa" },
            }
        });
    }
}

fn to_html_lines(text: &str) -> String {
    text.replace('\n', "<br>")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
