//! Command-line interface parsing for chartcache
//!
//! This module handles parsing of CLI arguments using clap, validation of the
//! requested year, and rendering of the chart listing printed to stdout.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use chrono::{Datelike, Local};
use clap::Parser;
use rand::Rng;
use thiserror::Error;

use crate::cache::default_cache_path;
use crate::data::{ChartResult, SourceConfig, DEFAULT_CHART_HOST};
use crate::pick::{random_year, DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR};

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The requested year has not happened yet
    #[error("Invalid year: {year} is in the future (current year is {current})")]
    FutureYear { year: i32, current: i32 },

    /// `--from` is after `--to`
    #[error("Invalid year range: --from {from} is after --to {to}")]
    EmptyRange { from: i32, to: i32 },
}

/// chartcache - Billboard Year-End Hot 100 top 20 for any year
#[derive(Parser, Debug)]
#[command(name = "chartcache")]
#[command(about = "Fetch the Billboard Year-End Hot 100 top 20 for a year, with a local cache")]
#[command(version)]
pub struct Cli {
    /// Year to fetch
    #[arg(required_unless_present = "pick")]
    pub year: Option<i32>,

    /// Force refresh (ignore cache)
    #[arg(long)]
    pub refresh: bool,

    /// Announce one random entry instead of listing the chart
    ///
    /// Without YEAR, a random year between --from and --to is used.
    #[arg(long)]
    pub pick: bool,

    /// First year considered by --pick without YEAR
    #[arg(long, value_name = "YEAR", default_value_t = DEFAULT_FIRST_YEAR)]
    pub from: i32,

    /// Last year considered by --pick without YEAR
    #[arg(long, value_name = "YEAR", default_value_t = DEFAULT_LAST_YEAR)]
    pub to: i32,

    /// Cache file location
    #[arg(long, value_name = "PATH", env = "CHARTCACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Base URL of the structured chart API (primary source; skipped when unset)
    #[arg(long, value_name = "URL", env = "CHARTCACHE_API_URL")]
    pub api_url: Option<String>,

    /// Host serving the year-end chart pages (fallback source)
    #[arg(long, value_name = "URL", env = "CHARTCACHE_CHART_HOST", default_value = DEFAULT_CHART_HOST)]
    pub chart_host: String,
}

/// What to print once the chart is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the numbered chart
    List,
    /// Print the announcement for one random entry
    Pick,
}

/// How the chart year is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearChoice {
    Fixed(i32),
    Random(RangeInclusive<i32>),
}

impl YearChoice {
    /// Returns the fixed year, or draws one from the range
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> i32 {
        match self {
            YearChoice::Fixed(year) => *year,
            YearChoice::Random(years) => random_year(years.clone(), rng),
        }
    }
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub year: YearChoice,
    pub mode: Mode,
    /// Whether to bypass the cache lookup
    pub force_refresh: bool,
    pub cache_path: PathBuf,
    pub sources: SourceConfig,
}

/// Checks that `year` is not later than `current_year`.
pub fn validate_year(year: i32, current_year: i32) -> Result<i32, CliError> {
    if year > current_year {
        return Err(CliError::FutureYear {
            year,
            current: current_year,
        });
    }
    Ok(year)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments, validated against
    /// the current calendar year.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Self::from_cli_in_year(cli, Local::now().year())
    }

    /// Creates a StartupConfig as if the current calendar year were `current_year`.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the year is in the future or the pick range is empty
    pub fn from_cli_in_year(cli: &Cli, current_year: i32) -> Result<Self, CliError> {
        let year = match cli.year {
            Some(year) => YearChoice::Fixed(validate_year(year, current_year)?),
            None => {
                if cli.from > cli.to {
                    return Err(CliError::EmptyRange {
                        from: cli.from,
                        to: cli.to,
                    });
                }
                YearChoice::Random(cli.from..=cli.to)
            }
        };

        let mode = if cli.pick { Mode::Pick } else { Mode::List };

        let sources = SourceConfig {
            api_url: cli.api_url.clone(),
            chart_host: cli.chart_host.clone(),
            ..SourceConfig::default()
        };

        Ok(StartupConfig {
            year,
            mode,
            force_refresh: cli.refresh,
            cache_path: cli.cache_file.clone().unwrap_or_else(default_cache_path),
            sources,
        })
    }
}

/// Renders the chart listing, or the no-data message for an empty chart
pub fn render_chart(year: i32, chart: &ChartResult) -> String {
    if chart.is_empty() {
        return format!("No data found for {year}.");
    }

    let mut lines = vec![format!(
        "Top {} Billboard Year-End Hot 100 for {}",
        chart.len(),
        year
    )];
    lines.extend(
        chart
            .iter()
            .map(|entry| format!("{}. '{}' - {}", entry.rank, entry.title, entry.artist)),
    );
    lines.join("\n")
}
