//! CLI entry point for the COVID-19 dashboard generator.
//!
//! Fetches the case feed once, aggregates it, and writes an interactive
//! HTML dashboard. `summary` stops after aggregation and logs the results.

use anyhow::Result;
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use covid_dashboard::{
    config::{DEFAULT_TOP_N, DashboardConfig, parse_utc_offset},
    fetch::{BasicClient, DEFAULT_FEED_URL, fetch_bytes},
    output::{print_json, write_country_csv, write_html},
    pipeline::Analysis,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "covid_dashboard")]
#[command(about = "Builds a global COVID-19 case dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed and render the dashboard to HTML
    Render {
        /// Path to a saved feed file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", env = "COVID_FEED_URL", default_value = DEFAULT_FEED_URL)]
        source: String,

        /// HTML file to write
        #[arg(short, long, env = "DASHBOARD_OUTPUT", default_value = "first_figure.html")]
        output: String,

        /// UTC offset used to display feed timestamps (e.g. "+05:30")
        #[arg(long, env = "DASHBOARD_UTC_OFFSET", default_value = "+00:00", value_parser = parse_utc_offset)]
        utc_offset: FixedOffset,

        /// Number of rows in each ranking
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,

        /// Optional: also export per-country totals to this CSV file
        #[arg(long)]
        csv: Option<String>,

        /// Log the chart specification as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch the feed and log totals, per-country sums and rankings
    Summary {
        /// Path to a saved feed file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", env = "COVID_FEED_URL", default_value = DEFAULT_FEED_URL)]
        source: String,

        /// UTC offset used to interpret feed timestamps
        #[arg(long, env = "DASHBOARD_UTC_OFFSET", default_value = "+00:00", value_parser = parse_utc_offset)]
        utc_offset: FixedOffset,

        /// Number of rows in each ranking
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/covid_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("covid_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            source,
            output,
            utc_offset,
            top_n,
            csv,
            json,
        } => {
            let config = DashboardConfig { utc_offset, top_n };
            let bytes = fetcher(&source).await?;
            let analysis = Analysis::from_feed_bytes(&bytes, &config)?;
            let spec = analysis.chart_spec()?;

            if json {
                print_json(&spec)?;
            }
            if let Some(csv_path) = csv {
                write_country_csv(&csv_path, &analysis.aggregates.countries)?;
                info!(path = %csv_path, countries = analysis.aggregates.countries.len(), "Country totals exported");
            }

            write_html(&output, &spec)?;
        }
        Commands::Summary {
            source,
            utc_offset,
            top_n,
        } => {
            let config = DashboardConfig { utc_offset, top_n };
            let bytes = fetcher(&source).await?;
            let analysis = Analysis::from_feed_bytes(&bytes, &config)?;
            log_summary(&analysis);
        }
    }

    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &str) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, url).await?
    } else {
        std::fs::read(url)?
    };
    Ok(bytes)
}

fn log_summary(analysis: &Analysis) {
    let aggregates = &analysis.aggregates;

    if analysis.observations.is_empty() {
        warn!(feed_records = analysis.feed_records, "No observations survived filtering");
    }

    info!(
        total_confirmed = aggregates.totals.total_confirmed,
        total_recovered = aggregates.totals.total_recovered,
        total_deaths = aggregates.totals.total_deaths,
        observations = analysis.observations.len(),
        "Global totals"
    );

    for country in &aggregates.countries {
        info!(
            country = %country.country,
            confirmed = country.confirmed_total,
            deaths = country.deaths_total,
            recovered = country.recovered_total,
            "Country"
        );
    }

    for ranking in [
        &aggregates.top_confirmed,
        &aggregates.top_recovered,
        &aggregates.top_deaths,
    ] {
        for (rank, entry) in ranking.entries.iter().enumerate() {
            info!(
                metric = ranking.metric.label(),
                rank = rank + 1,
                country = %entry.country,
                value = entry.value,
                "Ranking"
            );
        }
    }
}
