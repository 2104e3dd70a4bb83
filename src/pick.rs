//! Random chart pick
//!
//! Chooses a random chart year and a random entry from its chart, and renders
//! the line announcing it.

use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::{ChartEntry, ChartResult};

/// First year considered when no year is given
pub const DEFAULT_FIRST_YEAR: i32 = 1985;

/// Last year considered when no year is given
pub const DEFAULT_LAST_YEAR: i32 = 2005;

/// Picks a chart year uniformly from `years`
///
/// # Panics
/// Panics if `years` is empty.
pub fn random_year<R: Rng>(years: RangeInclusive<i32>, rng: &mut R) -> i32 {
    rng.gen_range(years)
}

/// Picks one of the entries actually present in `chart`
///
/// Returns `None` for an empty chart. Short charts are handled: only existing
/// positions can be chosen.
pub fn pick_entry<'a, R: Rng + ?Sized>(chart: &'a ChartResult, rng: &mut R) -> Option<&'a ChartEntry> {
    chart.entries().choose(rng)
}

/// Renders the announcement for a picked entry
pub fn announcement(year: i32, entry: &ChartEntry) -> String {
    format!(
        "peaking at number {} in {}, it's {} by {}!",
        entry.rank, year, entry.title, entry.artist
    )
}
