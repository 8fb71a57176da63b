use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, warn};

use super::{DrawSource, build_client};
use crate::error::SourceError;
use crate::types::{DrawRecord, LottoApiResponse};
use crate::utils::{estimate_draw_date, is_valid_number, validate_numbers};

/// How many draw numbers past the newest stored draw discovery will try.
pub const DISCOVERY_WINDOW: u32 = 10;

/// Structured JSON endpoint (`common.do?method=getLottoNumber&drwNo=N`).
pub struct ApiSource {
    client: reqwest::Client,
    url: String,
}

impl ApiSource {
    pub fn new(url: String, timeout: Duration) -> reqwest::Result<Self> {
        let client = build_client(timeout, "application/json, text/javascript, */*; q=0.01")?;
        Ok(Self { client, url })
    }

    async fn request_draw(&self, draw_no: u32) -> Result<DrawRecord, SourceError> {
        let body = self
            .client
            .get(&self.url)
            .query(&[("method", "getLottoNumber".to_string()), ("drwNo", draw_no.to_string())])
            .send()
            .await?
            .text()
            .await?;
        parse_api_response(&body)
    }
}

#[async_trait]
impl DrawSource for ApiSource {
    fn name(&self) -> &str {
        "api"
    }

    async fn fetch_draw(&self, draw_no: u32) -> Option<DrawRecord> {
        match self.request_draw(draw_no).await {
            Ok(record) if record.draw_no == draw_no => Some(record),
            Ok(record) => {
                warn!(draw_no, found = record.draw_no, "API returned a different draw");
                None
            }
            Err(e) => {
                warn!(draw_no, error = %e, "API fetch failed");
                None
            }
        }
    }

    async fn find_latest(&self, latest_known: Option<u32>) -> Option<u32> {
        let start = latest_known.map_or(1, |n| n.saturating_add(1));
        let mut latest = None;

        for draw_no in start..start.saturating_add(DISCOVERY_WINDOW) {
            match self.request_draw(draw_no).await {
                Ok(_) => latest = Some(draw_no),
                Err(e) => {
                    debug!(draw_no, error = %e, "discovery stopped");
                    break;
                }
            }
        }

        latest.or(latest_known)
    }
}

/// Turns a `getLottoNumber` body into a record.
///
/// Anything other than a JSON object with `returnValue == "success"` and six
/// valid numbers is rejected. Missing money fields become 0 and a missing
/// date falls back to the weekly-cadence estimate.
pub fn parse_api_response(body: &str) -> Result<DrawRecord, SourceError> {
    let response: LottoApiResponse = serde_json::from_str(body)?;
    if response.return_value != "success" {
        return Err(SourceError::NotSuccess(response.return_value));
    }

    let draw_no = response
        .draw_no
        .filter(|n| *n > 0)
        .ok_or_else(|| SourceError::Malformed("missing drwNo".to_string()))?;

    let numbers = [
        response.number_1,
        response.number_2,
        response.number_3,
        response.number_4,
        response.number_5,
        response.number_6,
    ];
    let numbers: Vec<u8> = numbers
        .into_iter()
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| SourceError::Malformed("missing winning number".to_string()))?;
    validate_numbers(&numbers).map_err(SourceError::Malformed)?;

    let bonus = response
        .bonus
        .filter(|b| is_valid_number(*b))
        .ok_or_else(|| SourceError::Malformed("missing or invalid bnusNo".to_string()))?;

    let draw_date = match response.draw_date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| SourceError::Malformed(format!("drwNoDate {:?}: {}", raw, e)))?,
        None => estimate_draw_date(draw_no)
            .ok_or_else(|| SourceError::Malformed(format!("no date for draw {}", draw_no)))?,
    };

    let mut sorted = [0u8; 6];
    sorted.copy_from_slice(&numbers);
    sorted.sort_unstable();

    Ok(DrawRecord {
        draw_no,
        draw_date,
        numbers: sorted,
        bonus,
        first_prize_amount: response.first_prize_amount.unwrap_or(0),
        first_prize_winners: response.first_prize_winners.unwrap_or(0),
        total_sales: response.total_sales.unwrap_or(0),
        second_prize_amount: None,
        second_prize_winners: None,
    })
}
