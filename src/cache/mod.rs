//! Cache module for storing resolved charts
//!
//! This module provides the chart cache: a single keyed document mapping a chart
//! year to its ranked entries. Stores read and write the whole document at once;
//! entries never expire and are only replaced by an explicit force refresh.

mod store;

pub use store::{
    default_cache_path, Cache, CacheError, CacheStore, JsonFileStore, MemoryStore, CACHE_FILE_NAME,
};
