//! Year-end chart page scraper
//!
//! Fallback retrieval tier. Fetches the public year-end Hot 100 page for a year
//! and pulls title/artist pairs out of the chart rows. The page ships one of two
//! row layouts, so a second row selector is tried when the first matches nothing.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{ChartResult, ChartSource, SourceConfig, SourceError, SourceOutcome};

/// Row containers in the list layout
const LIST_ITEM_SELECTOR: &str = "li.o-chart-results-list__item";

/// Row containers in the grid layout
const ROW_SELECTOR: &str = "div.o-chart-results-list-row";

/// Song title inside a row
const TITLE_SELECTOR: &str = "h3";

/// Artist label inside a row
const ARTIST_SELECTOR: &str = "span.c-label";

/// Client for scraping year-end chart pages
#[derive(Debug, Clone)]
pub struct ScrapeSource {
    http_client: Client,
    chart_host: String,
}

impl ScrapeSource {
    /// Creates a ScrapeSource with the configured host and page timeout
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.scrape_timeout)
            .build()?;
        Ok(Self {
            http_client,
            chart_host: config.chart_host.clone(),
        })
    }

    /// Returns the year-end chart page URL for a year
    pub fn chart_url(&self, year: i32) -> String {
        format!(
            "{}/charts/year-end/{}/hot-100-songs/",
            self.chart_host.trim_end_matches('/'),
            year
        )
    }

    /// Fetches and parses the chart page for a year
    ///
    /// A single attempt is made. The body is decoded leniently: invalid UTF-8
    /// sequences are replaced rather than rejected.
    pub async fn fetch_entries(&self, year: i32) -> Result<ChartResult, SourceError> {
        let url = self.chart_url(year);
        debug!(%url, "fetching chart page");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let html = String::from_utf8_lossy(&body);
        Ok(parse_chart_page(&html))
    }
}

#[async_trait]
impl ChartSource for ScrapeSource {
    fn name(&self) -> &str {
        "chart-page"
    }

    async fn fetch(&self, year: i32) -> SourceOutcome {
        SourceOutcome::settle(self.name(), year, self.fetch_entries(year).await)
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Extracts up to 20 ranked entries from a year-end chart page.
///
/// Rows lacking a title or an artist are skipped and do not consume a rank.
pub fn parse_chart_page(html: &str) -> ChartResult {
    let document = Html::parse_document(html);
    let title = selector(TITLE_SELECTOR);
    let artist = selector(ARTIST_SELECTOR);

    let mut rows: Vec<ElementRef<'_>> = document.select(&selector(LIST_ITEM_SELECTOR)).collect();
    if rows.is_empty() {
        debug!("no list rows found, trying grid layout");
        rows = document.select(&selector(ROW_SELECTOR)).collect();
    }

    ChartResult::from_ranked(rows.into_iter().filter_map(|row| {
        let song = first_text(row, &title)?;
        let by = first_text(row, &artist)?;
        Some((song, by))
    }))
}

/// Text of the first element under `row` matching `selector`, trimmed per text node
fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = row.select(selector).next()?;
    let text: String = element.text().map(str::trim).collect();
    (!text.is_empty()).then_some(text)
}
