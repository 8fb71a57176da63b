use rusqlite::Connection;
use serde::Serialize;

use super::NumberCount;
use crate::database::get_all_draws;
use crate::error::StatsError;
use crate::types::{DrawResultRow, MAX_NUMBER, MIN_NUMBER};

const TOP_COMPANIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastAppearance {
    pub draw_no: u32,
    pub draw_date: String,
    /// Draws held since, 0 when it came up in the latest draw.
    pub draws_ago: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberDetail {
    pub number: u8,
    pub total_draws: u32,
    pub total_count: u32,
    pub last_10: u32,
    pub last_30: u32,
    pub last_100: u32,
    /// Share of all draws containing the number, in percent.
    pub appearance_rate: f64,
    pub rate_30: Option<f64>,
    pub rate_100: Option<f64>,
    pub trend: Trend,
    pub last_appeared: Option<LastAppearance>,
    pub companions: Vec<NumberCount>,
}

/// Compares the last-30 rate with the last-100 rate.
///
/// Needs at least 100 draws. Works on the raw counts (`a/30` vs `b/100`) so
/// the 1.2x and 0.8x boundaries are exact: reaching 1.2x counts as
/// increasing, only falling below 0.8x counts as decreasing.
pub fn classify_trend(total_draws: u32, last_30: u32, last_100: u32) -> Trend {
    if total_draws < 100 {
        return Trend::Unknown;
    }
    if last_100 == 0 {
        return Trend::Stable;
    }
    let (a, b) = (u64::from(last_30), u64::from(last_100));
    // a/30 >= 1.2 * b/100  <=>  25a >= 9b
    if 25 * a >= 9 * b {
        Trend::Increasing
    // a/30 < 0.8 * b/100  <=>  25a < 6b
    } else if 25 * a < 6 * b {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Scans `draws` newest first and builds the profile of `number`.
pub fn detail_for(draws: &[DrawResultRow], number: u8) -> NumberDetail {
    let total_draws = draws.len() as u32;
    let mut total_count = 0u32;
    let (mut last_10, mut last_30, mut last_100) = (0u32, 0u32, 0u32);
    let mut last_appeared = None;
    let mut companion_counts: Vec<NumberCount> = Vec::new();

    for (idx, draw) in draws.iter().enumerate() {
        let numbers = draw.numbers();
        if !numbers.contains(&number) {
            continue;
        }

        total_count += 1;
        if idx < 10 {
            last_10 += 1;
        }
        if idx < 30 {
            last_30 += 1;
        }
        if idx < 100 {
            last_100 += 1;
        }
        if last_appeared.is_none() {
            last_appeared = Some(LastAppearance {
                draw_no: draw.draw_no,
                draw_date: draw.draw_date.format("%Y-%m-%d").to_string(),
                draws_ago: idx as u32,
            });
        }

        for other in numbers.into_iter().filter(|n| *n != number) {
            match companion_counts.iter_mut().find(|c| c.number == other) {
                Some(c) => c.count += 1,
                None => companion_counts.push(NumberCount { number: other, count: 1 }),
            }
        }
    }

    companion_counts.sort_by(|a, b| b.count.cmp(&a.count));
    companion_counts.truncate(TOP_COMPANIONS);

    let appearance_rate = if total_draws > 0 {
        f64::from(total_count) / f64::from(total_draws) * 100.0
    } else {
        0.0
    };

    NumberDetail {
        number,
        total_draws,
        total_count,
        last_10,
        last_30,
        last_100,
        appearance_rate,
        rate_30: (total_draws >= 30).then(|| f64::from(last_30) / 30.0),
        rate_100: (total_draws >= 100).then(|| f64::from(last_100) / 100.0),
        trend: classify_trend(total_draws, last_30, last_100),
        last_appeared,
        companions: companion_counts,
    }
}

/// Detail stats for one ball. Numbers outside 1-45 are rejected up front.
pub fn number_detail(conn: &Connection, number: i64) -> Result<NumberDetail, StatsError> {
    let number = u8::try_from(number)
        .ok()
        .filter(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n))
        .ok_or(StatsError::InvalidNumber(number))?;
    Ok(detail_for(&get_all_draws(conn)?, number))
}
