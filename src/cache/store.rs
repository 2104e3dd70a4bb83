//! Cache stores for persisting resolved charts
//!
//! Provides the `CacheStore` trait plus a JSON file store and an in-memory store.
//! The cache is always read and written as one whole document.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::data::ChartResult;

/// File name of the persisted cache document
pub const CACHE_FILE_NAME: &str = "billboard_cache.json";

/// Errors that can occur when loading or saving the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed
    #[error("failed to access cache file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cache file exists but is not a valid cache document
    #[error("cache file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory cache could not be serialized
    #[error("failed to serialize cache: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Mapping from chart year to its ranked entries
///
/// Serializes as a JSON object keyed by the decimal year, e.g.
/// `{"1999": [[1, "Smooth", "Santana Featuring Rob Thomas"], ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cache {
    charts: BTreeMap<String, ChartResult>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(year: i32) -> String {
        year.to_string()
    }

    /// Returns the cached chart for a year, if any
    pub fn get(&self, year: i32) -> Option<&ChartResult> {
        self.charts.get(&Self::key(year))
    }

    pub fn contains(&self, year: i32) -> bool {
        self.charts.contains_key(&Self::key(year))
    }

    /// Stores a chart for a year, returning the chart it replaced
    pub fn insert(&mut self, year: i32, chart: ChartResult) -> Option<ChartResult> {
        self.charts.insert(Self::key(year), chart)
    }

    /// Cached year keys in ascending order
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// Durable storage for the chart cache
///
/// Stores assume a single process accessing them sequentially; there is no locking.
pub trait CacheStore {
    /// Returns the persisted cache, or an empty cache if nothing was persisted yet
    fn load(&self) -> Result<Cache, CacheError>;

    /// Replaces the persisted cache with `cache`
    fn save(&self, cache: &Cache) -> Result<(), CacheError>;
}

/// Returns the default cache file location
///
/// Uses `~/.cache/chartcache/billboard_cache.json` on Linux, or the equivalent
/// XDG path on other platforms. Falls back to the working directory when no home
/// directory can be determined.
pub fn default_cache_path() -> PathBuf {
    ProjectDirs::from("", "", "chartcache")
        .map(|dirs| dirs.cache_dir().join(CACHE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME))
}

/// Cache store backed by a single pretty-printed JSON file
///
/// Writes replace the file in place and are not atomic.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens a store at `path`; the file is created on the first save
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<Cache, CacheError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache file yet");
                return Ok(Cache::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_slice(&content).map_err(|source| CacheError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, cache: &Cache) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(cache).map_err(CacheError::Serialize)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), years = cache.len(), "cache saved");
        Ok(())
    }
}

/// Cache store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    cache: Mutex<Cache>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `cache`
    pub fn with_cache(cache: Cache) -> Self {
        Self {
            cache: Mutex::new(cache),
        }
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<Cache, CacheError> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cache.clone())
    }

    fn save(&self, cache: &Cache) -> Result<(), CacheError> {
        let mut stored = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *stored = cache.clone();
        Ok(())
    }
}
