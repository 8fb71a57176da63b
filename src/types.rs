use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::{BallStyle, ball_styles};

/// Lowest and highest ball number of the 6/45 game.
pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 45;
pub const NUMBERS_PER_DRAW: usize = 6;

/// Normalized draw as produced by any acquisition path (API, scrape, seed file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub draw_no: u32,
    pub draw_date: NaiveDate,
    pub numbers: [u8; NUMBERS_PER_DRAW],
    pub bonus: u8,
    pub first_prize_amount: i64,
    pub first_prize_winners: i64,
    pub total_sales: i64,
    /// Only the seed spreadsheet carries second-prize figures.
    pub second_prize_amount: Option<i64>,
    pub second_prize_winners: Option<i64>,
}

impl DrawRecord {
    /// Winning numbers in ascending order.
    pub fn sorted_numbers(&self) -> [u8; NUMBERS_PER_DRAW] {
        let mut numbers = self.numbers;
        numbers.sort_unstable();
        numbers
    }
}

/// Raw JSON body of the `getLottoNumber` endpoint.
#[derive(Deserialize, Debug)]
pub struct LottoApiResponse {
    #[serde(rename = "returnValue")]
    pub return_value: String,
    #[serde(rename = "drwNo")]
    pub draw_no: Option<u32>,
    #[serde(rename = "drwNoDate")]
    pub draw_date: Option<String>,
    #[serde(rename = "drwtNo1")]
    pub number_1: Option<u8>,
    #[serde(rename = "drwtNo2")]
    pub number_2: Option<u8>,
    #[serde(rename = "drwtNo3")]
    pub number_3: Option<u8>,
    #[serde(rename = "drwtNo4")]
    pub number_4: Option<u8>,
    #[serde(rename = "drwtNo5")]
    pub number_5: Option<u8>,
    #[serde(rename = "drwtNo6")]
    pub number_6: Option<u8>,
    #[serde(rename = "bnusNo")]
    pub bonus: Option<u8>,
    #[serde(rename = "firstWinamnt", default)]
    pub first_prize_amount: Option<i64>,
    #[serde(rename = "firstPrzwnerCo", default)]
    pub first_prize_winners: Option<i64>,
    #[serde(rename = "totSellamnt", default)]
    pub total_sales: Option<i64>,
}

/// Stored row of the `draw_results` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResultRow {
    pub draw_no: u32,
    pub draw_date: NaiveDate,
    pub number_1: u8,
    pub number_2: u8,
    pub number_3: u8,
    pub number_4: u8,
    pub number_5: u8,
    pub number_6: u8,
    pub bonus_number: u8,
    pub first_prize_amount: i64,
    pub first_prize_winners: i64,
    pub total_sales: i64,
    pub second_prize_amount: i64,
    pub second_prize_winners: i64,
    pub created_at: String,
}

impl DrawResultRow {
    /// The six winning numbers, always ascending regardless of column order.
    pub fn numbers(&self) -> [u8; NUMBERS_PER_DRAW] {
        let mut numbers = [
            self.number_1,
            self.number_2,
            self.number_3,
            self.number_4,
            self.number_5,
            self.number_6,
        ];
        numbers.sort_unstable();
        numbers
    }

    pub fn summary(&self) -> DrawSummary {
        DrawSummary::new(
            self.draw_no,
            self.draw_date.format("%Y-%m-%d").to_string(),
            self.numbers(),
            self.bonus_number,
            self.first_prize_amount,
            self.first_prize_winners,
            self.total_sales,
        )
    }
}

/// Display-oriented view of one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawSummary {
    pub draw_no: u32,
    pub draw_date: String,
    pub winning_numbers: [u8; NUMBERS_PER_DRAW],
    pub bonus_number: u8,
    pub first_prize: i64,
    pub first_prize_winners: i64,
    pub total_sales: i64,
    pub balls: [BallStyle; NUMBERS_PER_DRAW],
}

impl DrawSummary {
    pub fn new(
        draw_no: u32,
        draw_date: String,
        winning_numbers: [u8; NUMBERS_PER_DRAW],
        bonus_number: u8,
        first_prize: i64,
        first_prize_winners: i64,
        total_sales: i64,
    ) -> Self {
        Self {
            draw_no,
            draw_date,
            winning_numbers,
            bonus_number,
            first_prize,
            first_prize_winners,
            total_sales,
            balls: ball_styles(winning_numbers),
        }
    }
}

/// One draw with its stored neighbours, for detail pages.
#[derive(Debug, Clone, Serialize)]
pub struct DrawWithNeighbours {
    pub draw: DrawSummary,
    pub prev_draw: Option<DrawSummary>,
    pub next_draw: Option<DrawSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_draws: u32,
    pub draws: Vec<DrawSummary>,
}

/// Result of an upsert keyed on `draw_no`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpsertOutcome {
    Created,
    Updated,
}
