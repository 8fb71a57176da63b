//! Fixed placeholder content shown while the store holds no draws.

use std::collections::BTreeMap;

use crate::stats::frequency::frequency_table;
use crate::stats::{NumberFrequency, Recommendation};
use crate::types::DrawSummary;

pub fn placeholder_draw() -> DrawSummary {
    DrawSummary::new(
        1100,
        "2024-01-06".to_string(),
        [17, 21, 22, 24, 26, 33],
        4,
        2_607_022_884,
        10,
        116_306_029_000,
    )
}

/// All 45 numbers with zero counts.
pub fn placeholder_number_stats() -> BTreeMap<u8, NumberFrequency> {
    frequency_table(&[])
}

pub fn placeholder_recommendations() -> Vec<Recommendation> {
    let sets: [([u8; 6], u8, &str); 3] = [
        ([3, 12, 19, 27, 34, 42], 78, "최근 10회 빈출번호 기반 조합"),
        ([5, 8, 17, 22, 31, 44], 71, "홀짝 비율 3:3 최적화"),
        ([1, 14, 20, 29, 38, 45], 66, "미출현 번호 + 구간 균형 조합"),
    ];
    sets.iter()
        .enumerate()
        .map(|(i, (numbers, confidence, strategy))| Recommendation {
            set_name: format!("AI 추천 {}세트", i + 1),
            numbers: *numbers,
            confidence: *confidence,
            strategy: strategy.to_string(),
        })
        .collect()
}
