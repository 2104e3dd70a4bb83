//! Core chart data models and chart sources
//!
//! This module contains the ranked chart types shared by the cache and the
//! acquisition service, plus the two retrieval tiers: the structured chart API
//! client and the year-end chart page scraper.

pub mod api;
pub mod scrape;

pub use api::ApiSource;
pub use scrape::ScrapeSource;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of entries kept for a single chart year
pub const MAX_ENTRIES: usize = 20;

/// Default host serving the year-end chart pages
pub const DEFAULT_CHART_HOST: &str = "https://www.billboard.com";

/// Timeout for a single chart page fetch
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

/// A single ranked song on a year-end chart
///
/// Persisted as the JSON triple `[rank, title, artist]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryRow", into = "EntryRow")]
pub struct ChartEntry {
    /// 1-based position on the chart
    pub rank: u32,
    /// Song title
    pub title: String,
    /// Credited artist
    pub artist: String,
}

#[derive(Serialize, Deserialize)]
struct EntryRow(u32, String, String);

impl From<EntryRow> for ChartEntry {
    fn from(EntryRow(rank, title, artist): EntryRow) -> Self {
        Self {
            rank,
            title,
            artist,
        }
    }
}

impl From<ChartEntry> for EntryRow {
    fn from(entry: ChartEntry) -> Self {
        EntryRow(entry.rank, entry.title, entry.artist)
    }
}

/// Error returned when a list of entries does not form a valid chart
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidChart {
    /// More entries than a chart may hold
    #[error("chart has {0} entries, at most {} allowed", MAX_ENTRIES)]
    TooManyEntries(usize),

    /// Ranks are not the sequence 1, 2, 3, ...
    #[error("entry at position {position} has rank {rank}")]
    RankOutOfSequence { position: usize, rank: u32 },
}

/// Ordered chart for one year: ranks run 1..=len with no gaps, len <= 20
///
/// A chart may hold fewer than [`MAX_ENTRIES`] entries when upstream had fewer
/// usable rows, and an empty chart means no data was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChartEntry>", into = "Vec<ChartEntry>")]
pub struct ChartResult {
    entries: Vec<ChartEntry>,
}

impl ChartResult {
    /// Builds a chart from `(title, artist)` rows in upstream order.
    ///
    /// Ranks are assigned locally as 1..=k; rows past [`MAX_ENTRIES`] are dropped
    /// without being pulled from the iterator.
    pub fn from_ranked<I, T, A>(rows: I) -> Self
    where
        I: IntoIterator<Item = (T, A)>,
        T: Into<String>,
        A: Into<String>,
    {
        let entries = rows
            .into_iter()
            .take(MAX_ENTRIES)
            .zip(1u32..)
            .map(|((title, artist), rank)| ChartEntry {
                rank,
                title: title.into(),
                artist: artist.into(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChartEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ChartEntry> {
        self.entries
    }
}

impl TryFrom<Vec<ChartEntry>> for ChartResult {
    type Error = InvalidChart;

    fn try_from(entries: Vec<ChartEntry>) -> Result<Self, Self::Error> {
        if entries.len() > MAX_ENTRIES {
            return Err(InvalidChart::TooManyEntries(entries.len()));
        }
        for (position, entry) in entries.iter().enumerate() {
            if entry.rank as usize != position + 1 {
                return Err(InvalidChart::RankOutOfSequence {
                    position,
                    rank: entry.rank,
                });
            }
        }
        Ok(Self { entries })
    }
}

impl From<ChartResult> for Vec<ChartEntry> {
    fn from(result: ChartResult) -> Self {
        result.entries
    }
}

impl<'a> IntoIterator for &'a ChartResult {
    type Item = &'a ChartEntry;
    type IntoIter = std::slice::Iter<'a, ChartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Errors that can occur inside a chart source
///
/// These never reach the acquisition service: a source logs them and reports
/// [`SourceOutcome::Unavailable`] instead.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source has no endpoint to query
    #[error("no chart API endpoint configured")]
    NotConfigured,

    /// HTTP request failed (connection, DNS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a single retrieval tier produced for a year
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The tier produced a non-empty chart
    Found(ChartResult),
    /// The tier produced nothing; the reason is kept for diagnostics
    Unavailable(String),
}

impl SourceOutcome {
    /// Folds a source's raw fetch result into an outcome, logging failures.
    ///
    /// An empty chart is reported as unavailable so the next tier is tried.
    pub fn settle(source: &str, year: i32, fetched: Result<ChartResult, SourceError>) -> Self {
        match fetched {
            Ok(result) if result.is_empty() => {
                warn!(source, year, "source returned no chart entries");
                SourceOutcome::Unavailable(format!("{source} returned no entries for {year}"))
            }
            Ok(result) => {
                debug!(source, year, entries = result.len(), "source returned chart");
                SourceOutcome::Found(result)
            }
            Err(SourceError::NotConfigured) => {
                debug!(source, year, "source is not configured");
                SourceOutcome::Unavailable(SourceError::NotConfigured.to_string())
            }
            Err(err) => {
                warn!(source, year, error = %err, "source failed");
                SourceOutcome::Unavailable(err.to_string())
            }
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SourceOutcome::Found(result) if !result.is_empty())
    }

    /// Returns the chart, empty when the tier was unavailable
    pub fn into_result(self) -> ChartResult {
        match self {
            SourceOutcome::Found(result) => result,
            SourceOutcome::Unavailable(_) => ChartResult::default(),
        }
    }
}

/// A retrieval tier in the fallback chain
///
/// Implementations must not fail: every problem is reported as
/// [`SourceOutcome::Unavailable`].
#[async_trait]
pub trait ChartSource: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Fetches up to [`MAX_ENTRIES`] ranked entries for the given year
    async fn fetch(&self, year: i32) -> SourceOutcome;
}

/// Endpoints and HTTP settings for the chart sources
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the structured chart API; the API tier is skipped when unset
    pub api_url: Option<String>,
    /// Base URL of the site serving year-end chart pages
    pub chart_host: String,
    /// Timeout for the chart page fetch
    pub scrape_timeout: Duration,
    /// User-Agent header sent by both sources
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            chart_host: DEFAULT_CHART_HOST.to_string(),
            scrape_timeout: SCRAPE_TIMEOUT,
            user_agent: concat!("chartcache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
