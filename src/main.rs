//! Weather Tracker CLI
//!
//! Serves the web dashboard, or runs one fetch/ask cycle in the terminal.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use weathertracker::config::LoggingConfig;
use weathertracker::{CityOutcome, Dashboard, TrackerConfig, web};

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Parser)]
#[command(name = "weathertracker")]
#[command(author, version, about = "Multi-city weather tracker with AI insights", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raise the log level once per flag
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web dashboard
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the current weather for a comma separated list of cities
    ///
    /// Example: weathertracker report "Paris, Tokyo, Lima" --chart temps.svg
    Report {
        /// Comma separated city names
        cities: String,

        /// Write the temperature comparison chart to this SVG file
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Ask the AI a question about one of the fetched cities
    Ask {
        /// Comma separated city names
        cities: String,

        /// City to ask about (defaults to the first fetched city)
        #[arg(long)]
        city: Option<String>,

        /// The question
        #[arg(short, long)]
        question: String,
    },
}

/// Configured level, raised by `-v`. `RUST_LOG` wins over both.
fn log_filter(config: &LoggingConfig, verbose: u8) -> String {
    let base = LEVELS
        .iter()
        .position(|level| level.eq_ignore_ascii_case(&config.level))
        .unwrap_or(2);
    let level = LEVELS[(base + usize::from(verbose)).min(LEVELS.len() - 1)];
    format!("weathertracker={level},tower_http={level}")
}

fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(config, verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TrackerConfig::load_from_path(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_logging(&config.logging, cli.verbose)?;
    info!("Weather Tracker v{} starting", weathertracker::VERSION);

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let dashboard = Arc::new(Dashboard::from_config(&config)?);
            web::run(&config.server, dashboard).await
        }
        Commands::Report { cities, chart } => {
            let dashboard = Dashboard::from_config(&config)?;
            report(&dashboard, &cities, chart).await
        }
        Commands::Ask {
            cities,
            city,
            question,
        } => {
            let dashboard = Dashboard::from_config(&config)?;
            ask(&dashboard, &cities, city, &question).await
        }
    }
}

async fn report(dashboard: &Dashboard, cities: &str, chart_path: Option<PathBuf>) -> Result<()> {
    let session = dashboard.start_session(cities).await;
    let Some(report) = &session.report else {
        return Ok(());
    };

    for outcome in &report.outcomes {
        println!("🔄 Fetching weather for {}...", outcome.query());
        match outcome {
            CityOutcome::Fetched { observation, .. } => println!("{observation}\n"),
            CityOutcome::Failed { query, error } => {
                println!("❌ Could not retrieve data for {query}. {}\n", error.hint());
            }
        }
    }

    match (&session.chart, chart_path) {
        (Some(chart), path) => {
            println!(
                "Average Temp: {:.2}°C (±1 Std Dev: {:.2} to {:.2})",
                chart.statistics.mean,
                chart.statistics.lower(),
                chart.statistics.upper()
            );
            if let Some(path) = path {
                std::fs::write(&path, &chart.svg)
                    .with_context(|| format!("Failed to write chart to {}", path.display()))?;
                println!("Chart written to {}", path.display());
            }
        }
        (None, Some(_)) => {
            let reason = session
                .chart_error
                .unwrap_or_else(|| "at least two cities are needed for a chart".to_string());
            warn!("No chart written: {}", reason);
        }
        (None, None) => {}
    }
    Ok(())
}

async fn ask(dashboard: &Dashboard, cities: &str, city: Option<String>, question: &str) -> Result<()> {
    let report = dashboard.fetch_all(cities).await;
    for (query, error) in report.failures() {
        println!("❌ Could not retrieve data for {query}. {}", error.hint());
    }

    let observations = report.observations();
    let city = match city.or_else(|| observations.names().first().map(|name| name.to_string())) {
        Some(city) => city,
        None => bail!("No city could be fetched, nothing to ask about"),
    };

    let answer = dashboard
        .ask(&observations, &city, question)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;
    println!("AI Insight: {answer}");
    Ok(())
}
