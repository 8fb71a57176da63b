use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use std::collections::HashSet;

use crate::types::{MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_DRAW};

/// Date of draw #1; every later draw follows on a weekly cadence.
pub fn first_draw_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2002, 12, 7).unwrap_or_default()
}

/// Estimates the draw date from its number: draw #1 + (draw_no - 1) weeks.
///
/// Used whenever a source carries no explicit date. It is an approximation:
/// holiday shifts in the real schedule are not modelled. `None` when the
/// result falls outside the representable calendar.
pub fn estimate_draw_date(draw_no: u32) -> Option<NaiveDate> {
    let weeks = i64::from(draw_no.saturating_sub(1));
    first_draw_date().checked_add_signed(TimeDelta::try_weeks(weeks)?)
}

/// Parses a currency amount that may carry thousands separators or spaces.
///
/// An empty string is 0. Fractional spreadsheet values are truncated.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Some(0);
    }
    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

/// Formats an amount with Korean-style thousands commas, e.g. `1,234,500`.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Background colour of a lotto ball, banded by tens.
pub fn ball_color(number: u8) -> &'static str {
    match number {
        1..=10 => "#FFC107",
        11..=20 => "#2196F3",
        21..=30 => "#F44336",
        31..=40 => "#9E9E9E",
        41..=45 => "#4CAF50",
        _ => "#666666",
    }
}

/// Text colour that stays readable on `ball_color`.
pub fn ball_text_color(number: u8) -> &'static str {
    match number {
        1..=10 => "#333333",
        _ => "#ffffff",
    }
}

/// Background and text colour pair for rendering one ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BallStyle {
    pub number: u8,
    pub background: &'static str,
    pub text: &'static str,
}

pub fn ball_styles(numbers: [u8; NUMBERS_PER_DRAW]) -> [BallStyle; NUMBERS_PER_DRAW] {
    numbers.map(|number| BallStyle {
        number,
        background: ball_color(number),
        text: ball_text_color(number),
    })
}

pub fn is_valid_number(number: u8) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&number)
}

/// Checks that a winning set holds six distinct numbers within 1-45.
pub fn validate_numbers(numbers: &[u8]) -> Result<(), String> {
    if numbers.len() != NUMBERS_PER_DRAW {
        return Err(format!("expected {} numbers, got {}", NUMBERS_PER_DRAW, numbers.len()));
    }
    if let Some(n) = numbers.iter().find(|n| !is_valid_number(**n)) {
        return Err(format!("number {} out of range", n));
    }
    let distinct: HashSet<u8> = numbers.iter().copied().collect();
    if distinct.len() != NUMBERS_PER_DRAW {
        return Err(format!("duplicate numbers in {:?}", numbers));
    }
    Ok(())
}
