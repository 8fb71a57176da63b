//! The "current draw + stats + recommendations" bundle behind the landing page.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::fallback;
use crate::stats::{
    NumberCount, NumberFrequency, Recommendation, cold_numbers, current_draw, daily_numbers,
    number_stats, recent_draws, recommendations, top_numbers,
};
use crate::types::DrawSummary;

const RECENT_DRAWS: u32 = 5;
const RANKING_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct LandingBundle {
    /// True when the store is empty and the fixed placeholder data is shown.
    pub placeholder: bool,
    pub current_draw: DrawSummary,
    pub number_stats: BTreeMap<u8, NumberFrequency>,
    pub recommendations: Vec<Recommendation>,
    pub recent_draws: Vec<DrawSummary>,
    pub hot_numbers: Vec<NumberCount>,
    pub cold_numbers: Vec<NumberCount>,
    pub daily_numbers: [u8; 6],
}

/// Side panels must never take the page down; they degrade to empty.
fn or_empty<T: Default>(what: &str, result: rusqlite::Result<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(section = what, error = %e, "landing section unavailable");
        T::default()
    })
}

pub fn landing_bundle(conn: &Connection, day: NaiveDate) -> rusqlite::Result<LandingBundle> {
    let daily = daily_numbers(day);

    let Some(current_draw) = current_draw(conn)? else {
        return Ok(LandingBundle {
            placeholder: true,
            current_draw: fallback::placeholder_draw(),
            number_stats: fallback::placeholder_number_stats(),
            recommendations: fallback::placeholder_recommendations(),
            recent_draws: Vec::new(),
            hot_numbers: Vec::new(),
            cold_numbers: Vec::new(),
            daily_numbers: daily,
        });
    };

    Ok(LandingBundle {
        placeholder: false,
        current_draw,
        number_stats: number_stats(conn)?,
        recommendations: recommendations(conn, day)?,
        recent_draws: or_empty("recent_draws", recent_draws(conn, RECENT_DRAWS)),
        hot_numbers: or_empty("hot_numbers", top_numbers(conn, RANKING_SIZE)),
        cold_numbers: or_empty("cold_numbers", cold_numbers(conn, RANKING_SIZE)),
        daily_numbers: daily,
    })
}
