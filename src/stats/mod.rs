//! Read-only statistics over the stored draws.
//!
//! Every entry point reads one snapshot of the store (newest draw first) and
//! hands it to a pure function, so a statistic computed during ingestion is
//! at worst based on a partially updated window.

pub mod detail;
pub mod frequency;
pub mod recommend;

use rusqlite::Connection;
use serde::Serialize;

use crate::database::{get_latest_draw, get_recent_draws};
use crate::types::{DrawResultRow, DrawSummary, MAX_NUMBER, MIN_NUMBER};

pub use detail::{NumberDetail, Trend, number_detail};
pub use frequency::{NumberFrequency, cold_numbers, number_stats, top_numbers};
pub use recommend::{Recommendation, daily_numbers, extended_recommendations, recommendations};

/// A ball number with how often it was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberCount {
    pub number: u8,
    pub count: u32,
}

/// Latest draw in display form, `None` for an empty store.
pub fn current_draw(conn: &Connection) -> rusqlite::Result<Option<DrawSummary>> {
    Ok(get_latest_draw(conn)?.map(|d| d.summary()))
}

/// The `count` most recent draws in display form, newest first.
pub fn recent_draws(conn: &Connection, count: u32) -> rusqlite::Result<Vec<DrawSummary>> {
    Ok(get_recent_draws(conn, count)?
        .iter()
        .map(DrawResultRow::summary)
        .collect())
}

/// Per-number appearance counts over `draws` (bonus excluded). Index 0 unused.
pub(crate) fn count_numbers(draws: &[DrawResultRow]) -> [u32; MAX_NUMBER as usize + 1] {
    let mut counts = [0u32; MAX_NUMBER as usize + 1];
    for draw in draws {
        for n in draw.numbers() {
            counts[n as usize] += 1;
        }
    }
    counts
}

/// Numbers that appear in `draws`, most frequent first.
///
/// Ties keep the order in which numbers were first met while scanning
/// newest draw first, ascending within a draw.
pub(crate) fn ranked_counts(draws: &[DrawResultRow]) -> Vec<NumberCount> {
    let mut seen: Vec<NumberCount> = Vec::new();
    let mut slot = [usize::MAX; MAX_NUMBER as usize + 1];

    for draw in draws {
        for n in draw.numbers() {
            let idx = n as usize;
            if slot[idx] == usize::MAX {
                slot[idx] = seen.len();
                seen.push(NumberCount { number: n, count: 0 });
            }
            seen[slot[idx]].count += 1;
        }
    }

    // stable: ties stay in encounter order
    seen.sort_by(|a, b| b.count.cmp(&a.count));
    seen
}

pub(crate) fn all_numbers() -> impl Iterator<Item = u8> {
    MIN_NUMBER..=MAX_NUMBER
}
