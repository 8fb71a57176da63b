use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{NumberCount, all_numbers, count_numbers, ranked_counts};
use crate::database::get_all_draws;
use crate::types::DrawResultRow;

pub const FREQUENCY_WINDOWS: [usize; 3] = [10, 30, 100];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NumberFrequency {
    pub freq_10: u32,
    pub freq_30: u32,
    pub freq_100: u32,
    pub freq_total: u32,
}

/// Frequency of every number 1-45 over the last 10, 30, 100 and all draws.
pub fn frequency_table(draws: &[DrawResultRow]) -> BTreeMap<u8, NumberFrequency> {
    let window = |size: usize| count_numbers(&draws[..draws.len().min(size)]);
    let last_10 = window(FREQUENCY_WINDOWS[0]);
    let last_30 = window(FREQUENCY_WINDOWS[1]);
    let last_100 = window(FREQUENCY_WINDOWS[2]);
    let total = count_numbers(draws);

    all_numbers()
        .map(|n| {
            let i = n as usize;
            (
                n,
                NumberFrequency {
                    freq_10: last_10[i],
                    freq_30: last_30[i],
                    freq_100: last_100[i],
                    freq_total: total[i],
                },
            )
        })
        .collect()
}

/// Most frequently drawn numbers of all time. Never-drawn numbers are left out.
pub fn hottest(draws: &[DrawResultRow], n: usize) -> Vec<NumberCount> {
    ranked_counts(draws).into_iter().take(n).collect()
}

/// Least frequently drawn numbers, counting never-drawn numbers as 0.
///
/// This is the all-time ranking read from its tail: never-drawn numbers
/// come first, from 45 downwards.
pub fn coldest(draws: &[DrawResultRow], n: usize) -> Vec<NumberCount> {
    let mut ranked = ranked_counts(draws);
    let missing: Vec<u8> = all_numbers()
        .filter(|num| !ranked.iter().any(|c| c.number == *num))
        .collect();
    ranked.extend(missing.into_iter().map(|number| NumberCount { number, count: 0 }));
    ranked.into_iter().rev().take(n).collect()
}

pub fn number_stats(conn: &Connection) -> rusqlite::Result<BTreeMap<u8, NumberFrequency>> {
    Ok(frequency_table(&get_all_draws(conn)?))
}

pub fn top_numbers(conn: &Connection, n: usize) -> rusqlite::Result<Vec<NumberCount>> {
    Ok(hottest(&get_all_draws(conn)?, n))
}

pub fn cold_numbers(conn: &Connection, n: usize) -> rusqlite::Result<Vec<NumberCount>> {
    Ok(coldest(&get_all_draws(conn)?, n))
}
