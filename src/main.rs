//! chartcache - Billboard Year-End Hot 100 top 20 for any year
//!
//! Prints the cached or freshly fetched chart for a year, or announces a random
//! entry from it. Logs go to stderr so stdout carries only the chart.

use std::process::ExitCode;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use chartcache::cache::JsonFileStore;
use chartcache::cli::{render_chart, Cli, Mode, StartupConfig};
use chartcache::pick::{announcement, pick_entry};
use chartcache::service::ChartService;

/// Installs the stderr log subscriber, defaulting to `info` unless `RUST_LOG` is set
fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let year = config.year.resolve(&mut rand::thread_rng());

    let store = JsonFileStore::open(&config.cache_path);
    let service = ChartService::with_default_sources(store, &config.sources)?;
    let chart = service.get_top(year, config.force_refresh).await?;

    match config.mode {
        Mode::List => println!("{}", render_chart(year, &chart)),
        Mode::Pick => match pick_entry(&chart, &mut rand::thread_rng()) {
            Some(entry) => println!("{}", announcement(year, entry)),
            None => println!("No songs returned for {year}."),
        },
    }

    println!("[Done in {:.2}s]", start.elapsed().as_secs_f64());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logging();

    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
