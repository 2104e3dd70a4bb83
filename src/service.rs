//! Chart acquisition service
//!
//! Resolves a year's chart by consulting the cache first and then walking an
//! ordered list of sources until one yields data. Only non-empty charts are
//! written back, so a year that no source could resolve is retried next time.

use tracing::{debug, info};

use crate::cache::{CacheError, CacheStore};
use crate::data::{
    ApiSource, ChartResult, ChartSource, ScrapeSource, SourceConfig, SourceError, SourceOutcome,
};

/// Orchestrates cache lookups and the source fallback chain
pub struct ChartService<S> {
    store: S,
    sources: Vec<Box<dyn ChartSource>>,
}

impl<S: CacheStore> ChartService<S> {
    /// Creates a service over `store` that tries `sources` in order
    pub fn new(store: S, sources: Vec<Box<dyn ChartSource>>) -> Self {
        Self { store, sources }
    }

    /// Creates a service with the chart API as primary tier and the chart page
    /// scraper as fallback
    pub fn with_default_sources(store: S, config: &SourceConfig) -> Result<Self, SourceError> {
        let sources: Vec<Box<dyn ChartSource>> = vec![
            Box::new(ApiSource::new(config)?),
            Box::new(ScrapeSource::new(config)?),
        ];
        Ok(Self::new(store, sources))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Closes the service and hands back its store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Returns up to 20 ranked entries for `year`.
    ///
    /// # Arguments
    /// * `year` - The chart year
    /// * `force_refresh` - Skip the cache lookup and overwrite the cached chart
    ///   if a source succeeds
    ///
    /// # Returns
    /// * `Ok(ChartResult)` - The chart, empty when no source had data
    /// * `Err(CacheError)` - If the cache cannot be loaded or saved
    pub async fn get_top(&self, year: i32, force_refresh: bool) -> Result<ChartResult, CacheError> {
        let mut cache = self.store.load()?;

        if !force_refresh {
            if let Some(cached) = cache.get(year) {
                info!(year, entries = cached.len(), "cache hit");
                return Ok(cached.clone());
            }
        }

        let Some(chart) = self.resolve(year).await else {
            info!(year, "no source returned chart data");
            return Ok(ChartResult::default());
        };

        cache.insert(year, chart.clone());
        self.store.save(&cache)?;
        info!(year, entries = chart.len(), "chart cached");
        Ok(chart)
    }

    /// Walks the sources in order, stopping at the first non-empty chart
    async fn resolve(&self, year: i32) -> Option<ChartResult> {
        for (tier, source) in self.sources.iter().enumerate() {
            if tier > 0 {
                info!(source = source.name(), year, "falling back to next source");
            }
            match source.fetch(year).await {
                SourceOutcome::Found(chart) if !chart.is_empty() => return Some(chart),
                SourceOutcome::Found(_) => {
                    debug!(source = source.name(), year, "source returned an empty chart");
                }
                SourceOutcome::Unavailable(reason) => {
                    debug!(source = source.name(), year, %reason, "source unavailable");
                }
            }
        }
        None
    }
}
