//! Structured chart API client
//!
//! Primary retrieval tier. Queries a JSON chart endpoint for a year's ranking and
//! keeps the first 20 entries in the order the API lists them.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ChartResult, ChartSource, SourceConfig, SourceError, SourceOutcome};

/// Path below the API base URL serving year-end charts
const CHART_PATH: &str = "charts/hot-100/year-end";

/// Response from the chart API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    entries: Vec<ApiEntry>,
}

/// A single chart row from the API
///
/// Any rank the API reports is ignored; list order decides the rank.
#[derive(Debug, Deserialize)]
struct ApiEntry {
    title: String,
    artist: String,
}

/// Client for the structured chart API
#[derive(Debug, Clone)]
pub struct ApiSource {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the API; `None` leaves this tier unavailable
    base_url: Option<String>,
}

impl ApiSource {
    /// Creates an ApiSource from the source configuration
    ///
    /// No explicit timeout is set; the transport defaults apply.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            http_client,
            base_url: config.api_url.clone(),
        })
    }

    /// Creates an ApiSource pointing at a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: Some(base_url.into()),
        }
    }

    /// Builds the chart URL for a year
    fn chart_url(base_url: &str, year: i32) -> String {
        format!("{}/{}/{}", base_url.trim_end_matches('/'), CHART_PATH, year)
    }

    /// Fetches the chart for a year directly from the API
    ///
    /// # Returns
    /// * `Ok(ChartResult)` - Up to 20 entries, possibly empty
    /// * `Err(SourceError)` - If no endpoint is configured, the request fails,
    ///   upstream answers with an error status, or the body is not the expected JSON
    pub async fn fetch_entries(&self, year: i32) -> Result<ChartResult, SourceError> {
        let base_url = self.base_url.as_deref().ok_or(SourceError::NotConfigured)?;
        let url = Self::chart_url(base_url, year);
        debug!(%url, "querying chart API");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        parse_response(&text)
    }
}

#[async_trait]
impl ChartSource for ApiSource {
    fn name(&self) -> &str {
        "chart-api"
    }

    async fn fetch(&self, year: i32) -> SourceOutcome {
        SourceOutcome::settle(self.name(), year, self.fetch_entries(year).await)
    }
}

/// Parses an API response body into a chart
fn parse_response(text: &str) -> Result<ChartResult, SourceError> {
    let response: ApiResponse = serde_json::from_str(text)?;
    Ok(ChartResult::from_ranked(
        response.entries.into_iter().map(|e| (e.title, e.artist)),
    ))
}
