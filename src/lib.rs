//! chartcache library
//!
//! Fetches the Billboard Year-End Hot 100 top 20 for a year through a cached,
//! two-tier source chain. Exposed as a library for use in integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod pick;
pub mod service;
