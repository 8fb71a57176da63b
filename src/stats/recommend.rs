//! Day-seeded "AI" recommendation sets.
//!
//! Every call builds its own generator seeded with the calendar day, so all
//! requests on one day see identical sets and the next day gets a new but
//! equally reproducible sequence.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use serde::Serialize;

use super::{all_numbers, count_numbers, ranked_counts};
use crate::database::get_recent_draws;
use crate::types::{DrawResultRow, MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_DRAW};

const HOT_POOL_SIZE: usize = 15;
const PRIMES: [u8; 14] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43];
pub const MAX_EXTENDED_SETS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub set_name: String,
    pub numbers: [u8; NUMBERS_PER_DRAW],
    pub confidence: u8,
    pub strategy: String,
}

/// Hot/cold pools derived from the recent draws.
#[derive(Debug, Clone, Default)]
pub struct NumberPools {
    /// Most frequent in the last 10 draws.
    pub hot_10: Vec<u8>,
    /// Drawn at most once in the last 10 draws.
    pub cold_10: Vec<u8>,
    pub hot_30: Vec<u8>,
    /// Drawn at most twice in the last 30 draws.
    pub cold_30: Vec<u8>,
}

impl NumberPools {
    /// `recent` is newest first and needs no more than 30 draws.
    pub fn from_recent(recent: &[DrawResultRow]) -> Self {
        let last_10 = &recent[..recent.len().min(10)];
        let last_30 = &recent[..recent.len().min(30)];

        let hot = |window: &[DrawResultRow]| -> Vec<u8> {
            ranked_counts(window)
                .into_iter()
                .take(HOT_POOL_SIZE)
                .map(|c| c.number)
                .collect()
        };
        let cold = |window: &[DrawResultRow], max: u32| -> Vec<u8> {
            let counts = count_numbers(window);
            all_numbers().filter(|n| counts[*n as usize] <= max).collect()
        };

        Self {
            hot_10: hot(last_10),
            cold_10: cold(last_10, 1),
            hot_30: hot(last_30),
            cold_30: cold(last_30, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    HotRecent,
    OddEven,
    ColdMix,
    LowHigh,
    ConsecutivePair,
    ZoneBalance,
    PrimeEmphasis,
    LastDigitSpread,
    FixedInterval,
    HotColdLongRun,
}

const EXTENDED_ORDER: [Strategy; MAX_EXTENDED_SETS] = [
    Strategy::HotRecent,
    Strategy::OddEven,
    Strategy::ColdMix,
    Strategy::LowHigh,
    Strategy::ConsecutivePair,
    Strategy::ZoneBalance,
    Strategy::PrimeEmphasis,
    Strategy::LastDigitSpread,
    Strategy::FixedInterval,
    Strategy::HotColdLongRun,
];

impl Strategy {
    fn label(self) -> &'static str {
        match self {
            Strategy::HotRecent => "최근 10회 빈출번호 기반 조합",
            Strategy::OddEven => "홀짝 비율 3:3 최적화",
            Strategy::ColdMix => "미출현 번호 + 구간 균형 조합",
            Strategy::LowHigh => "저번호·고번호 3:3 균형",
            Strategy::ConsecutivePair => "연속번호 1쌍 포함 조합",
            Strategy::ZoneBalance => "5개 번호대 균형 배치",
            Strategy::PrimeEmphasis => "소수 3개 포함 조합",
            Strategy::LastDigitSpread => "끝수 분산 조합",
            Strategy::FixedInterval => "등간격 배치 조합",
            Strategy::HotColdLongRun => "최근 30회 빈출 + 장기 미출현 조합",
        }
    }

    fn confidence_range(self) -> (u8, u8) {
        match self {
            Strategy::HotRecent => (70, 85),
            Strategy::OddEven => (65, 78),
            Strategy::ColdMix => (60, 72),
            Strategy::LowHigh => (63, 76),
            Strategy::ConsecutivePair => (58, 70),
            Strategy::ZoneBalance => (60, 74),
            Strategy::PrimeEmphasis => (57, 69),
            Strategy::LastDigitSpread => (55, 68),
            Strategy::FixedInterval => (52, 65),
            Strategy::HotColdLongRun => (62, 75),
        }
    }

    fn pick(self, pools: &NumberPools, rng: &mut StdRng) -> Vec<u8> {
        match self {
            Strategy::HotRecent => sample(rng, head(&pools.hot_10, 12), 6),
            Strategy::OddEven => {
                let odds: Vec<u8> = all_numbers().filter(|n| n % 2 == 1).collect();
                let evens: Vec<u8> = all_numbers().filter(|n| n % 2 == 0).collect();
                let mut picked = sample(rng, &odds, 3);
                picked.extend(sample(rng, &evens, 3));
                picked
            }
            Strategy::ColdMix => {
                if pools.cold_10.len() >= 3 {
                    let mut picked = sample(rng, &pools.cold_10, 3);
                    picked.extend(sample(rng, head(&pools.hot_10, 10), 3));
                    picked
                } else {
                    let everything: Vec<u8> = all_numbers().collect();
                    sample(rng, &everything, 6)
                }
            }
            Strategy::LowHigh => {
                let low: Vec<u8> = (1..=22).collect();
                let high: Vec<u8> = (23..=45).collect();
                let mut picked = sample(rng, &low, 3);
                picked.extend(sample(rng, &high, 3));
                picked
            }
            Strategy::ConsecutivePair => {
                let start = rng.random_range(MIN_NUMBER..MAX_NUMBER);
                let rest: Vec<u8> = all_numbers()
                    .filter(|n| *n != start && *n != start + 1)
                    .collect();
                let mut picked = vec![start, start + 1];
                picked.extend(sample(rng, &rest, 4));
                picked
            }
            Strategy::ZoneBalance => {
                let zones: [(u8, u8); 5] = [(1, 10), (11, 20), (21, 30), (31, 40), (41, 45)];
                let mut picked: Vec<u8> = zones
                    .iter()
                    .map(|(lo, hi)| rng.random_range(*lo..=*hi))
                    .collect();
                let rest: Vec<u8> = all_numbers().filter(|n| !picked.contains(n)).collect();
                picked.extend(sample(rng, &rest, 1));
                picked
            }
            Strategy::PrimeEmphasis => {
                let others: Vec<u8> = all_numbers().filter(|n| !PRIMES.contains(n)).collect();
                let mut picked = sample(rng, &PRIMES, 3);
                picked.extend(sample(rng, &others, 3));
                picked
            }
            Strategy::LastDigitSpread => {
                let digits: Vec<u8> = (0..=9).collect();
                sample(rng, &digits, 6)
                    .into_iter()
                    .map(|digit| {
                        let candidates: Vec<u8> =
                            all_numbers().filter(|n| n % 10 == digit).collect();
                        candidates[rng.random_range(0..candidates.len())]
                    })
                    .collect()
            }
            Strategy::FixedInterval => {
                let step = rng.random_range(5u8..=8);
                let start = rng.random_range(MIN_NUMBER..=MAX_NUMBER - 5 * step);
                (0..6).map(|i| start + i * step).collect()
            }
            Strategy::HotColdLongRun => {
                let mut picked = sample(rng, &pools.hot_30, 4);
                picked.extend(sample(rng, &pools.cold_30, 2));
                picked
            }
        }
    }
}

fn head(pool: &[u8], n: usize) -> &[u8] {
    &pool[..pool.len().min(n)]
}

/// Up to `k` distinct entries of `pool`, by partial Fisher-Yates.
fn sample(rng: &mut StdRng, pool: &[u8], k: usize) -> Vec<u8> {
    let mut items = pool.to_vec();
    let k = k.min(items.len());
    for i in 0..k {
        let j = rng.random_range(i..items.len());
        items.swap(i, j);
    }
    items.truncate(k);
    items
}

/// Dedupes, tops up to six from the generator and sorts ascending.
pub(crate) fn complete_set(rng: &mut StdRng, picked: Vec<u8>) -> [u8; NUMBERS_PER_DRAW] {
    let mut unique: Vec<u8> = Vec::with_capacity(NUMBERS_PER_DRAW);
    for n in picked {
        if (MIN_NUMBER..=MAX_NUMBER).contains(&n) && !unique.contains(&n) {
            unique.push(n);
        }
    }
    unique.truncate(NUMBERS_PER_DRAW);

    while unique.len() < NUMBERS_PER_DRAW {
        let candidate = rng.random_range(MIN_NUMBER..=MAX_NUMBER);
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }

    let mut set = [0u8; NUMBERS_PER_DRAW];
    set.copy_from_slice(&unique);
    set.sort_unstable();
    set
}

/// Generator for `day`; the seed is the proleptic Gregorian day number.
pub fn day_rng(day: NaiveDate) -> StdRng {
    StdRng::seed_from_u64(day.num_days_from_ce() as u64)
}

fn generate(pools: &NumberPools, strategies: &[Strategy], rng: &mut StdRng) -> Vec<Recommendation> {
    strategies
        .iter()
        .enumerate()
        .map(|(i, strategy)| {
            let picked = strategy.pick(pools, rng);
            let numbers = complete_set(rng, picked);
            let (lo, hi) = strategy.confidence_range();
            Recommendation {
                set_name: format!("AI 추천 {}세트", i + 1),
                numbers,
                confidence: rng.random_range(lo..=hi),
                strategy: strategy.label().to_string(),
            }
        })
        .collect()
}

/// The three landing-page sets for `day`.
pub fn recommend_sets(recent: &[DrawResultRow], day: NaiveDate) -> Vec<Recommendation> {
    let pools = NumberPools::from_recent(recent);
    generate(&pools, &EXTENDED_ORDER[..3], &mut day_rng(day))
}

/// Up to ten sets for `day`, one per strategy.
pub fn recommend_extended(recent: &[DrawResultRow], day: NaiveDate, count: usize) -> Vec<Recommendation> {
    let pools = NumberPools::from_recent(recent);
    let count = count.clamp(1, MAX_EXTENDED_SETS);
    generate(&pools, &EXTENDED_ORDER[..count], &mut day_rng(day))
}

pub fn recommendations(conn: &Connection, day: NaiveDate) -> rusqlite::Result<Vec<Recommendation>> {
    Ok(recommend_sets(&get_recent_draws(conn, 30)?, day))
}

pub fn extended_recommendations(
    conn: &Connection,
    day: NaiveDate,
    count: usize,
) -> rusqlite::Result<Vec<Recommendation>> {
    Ok(recommend_extended(&get_recent_draws(conn, 30)?, day, count))
}

/// Six "lucky numbers of the day", independent of stored draws.
pub fn daily_numbers(day: NaiveDate) -> [u8; NUMBERS_PER_DRAW] {
    let mut rng = day_rng(day);
    let everything: Vec<u8> = all_numbers().collect();
    let picked = sample(&mut rng, &everything, NUMBERS_PER_DRAW);
    complete_set(&mut rng, picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::history;
    use std::collections::HashSet;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_history() -> Vec<DrawResultRow> {
        let sets: Vec<[u8; 6]> = (0..40u8)
            .map(|i| {
                let b = i % 39 + 1;
                [b, (b + 6) % 45 + 1, (b + 13) % 45 + 1, (b + 20) % 45 + 1, (b + 27) % 45 + 1, (b + 34) % 45 + 1]
            })
            .collect();
        history(&sets)
    }

    fn assert_valid(set: &[u8; 6]) {
        let distinct: HashSet<u8> = set.iter().copied().collect();
        assert_eq!(distinct.len(), 6, "duplicates in {:?}", set);
        assert!(set.iter().all(|n| (1..=45).contains(n)));
        assert!(set.windows(2).all(|w| w[0] < w[1]), "not sorted: {:?}", set);
    }

    #[test]
    fn test_same_day_is_identical() {
        let draws = sample_history();
        let today = day(2026, 10, 18);
        assert_eq!(recommend_sets(&draws, today), recommend_sets(&draws, today));
        assert_eq!(recommend_extended(&draws, today, 10), recommend_extended(&draws, today, 10));
        assert_eq!(daily_numbers(today), daily_numbers(today));
    }

    #[test]
    fn test_next_day_differs() {
        let draws = sample_history();
        let a = recommend_extended(&draws, day(2026, 10, 18), 10);
        let b = recommend_extended(&draws, day(2026, 10, 19), 10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sets_are_valid_and_labelled() {
        let draws = sample_history();
        let sets = recommend_extended(&draws, day(2025, 3, 1), 10);
        assert_eq!(sets.len(), 10);
        for (i, (rec, strategy)) in sets.iter().zip(EXTENDED_ORDER).enumerate() {
            assert_valid(&rec.numbers);
            assert_eq!(rec.set_name, format!("AI 추천 {}세트", i + 1));
            assert_eq!(rec.strategy, strategy.label());
            let (lo, hi) = strategy.confidence_range();
            assert!((lo..=hi).contains(&rec.confidence));
        }
    }

    #[test]
    fn test_three_sets_prefix_of_extended_strategies() {
        let sets = recommend_sets(&sample_history(), day(2025, 3, 1));
        let labels: Vec<&str> = sets.iter().map(|r| r.strategy.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                Strategy::HotRecent.label(),
                Strategy::OddEven.label(),
                Strategy::ColdMix.label()
            ]
        );
    }

    #[test]
    fn test_empty_history_still_yields_full_sets() {
        for rec in recommend_extended(&[], day(2024, 1, 1), 10) {
            assert_valid(&rec.numbers);
        }
    }

    #[test]
    fn test_extended_count_clamped() {
        assert_eq!(recommend_extended(&[], day(2024, 1, 1), 0).len(), 1);
        assert_eq!(recommend_extended(&[], day(2024, 1, 1), 99).len(), 10);
    }

    #[test]
    fn test_complete_set_dedupes_and_fills() {
        let mut rng = day_rng(day(2024, 5, 5));
        let set = complete_set(&mut rng, vec![5, 5, 9, 0, 46]);
        assert_valid(&set);
        assert!(set.contains(&5) && set.contains(&9));
    }

    #[test]
    fn test_odd_even_balance() {
        let pools = NumberPools::default();
        let mut rng = day_rng(day(2024, 7, 7));
        let picked = Strategy::OddEven.pick(&pools, &mut rng);
        assert_eq!(picked.iter().filter(|n| *n % 2 == 1).count(), 3);
        assert_eq!(picked.len(), 6);
    }

    #[test]
    fn test_pools_from_recent() {
        let draws = history(&[[1, 2, 3, 4, 5, 6], [1, 2, 3, 7, 8, 9]]);
        let pools = NumberPools::from_recent(&draws);
        assert_eq!(&pools.hot_10[..3], &[1, 2, 3]);
        assert!(!pools.cold_10.contains(&1));
        assert!(pools.cold_10.contains(&4));
        assert!(pools.cold_10.contains(&45));
        assert!(pools.cold_30.contains(&1));
    }
}
