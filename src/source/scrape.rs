use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, warn};

use super::{DrawSource, build_client};
use crate::error::SourceError;
use crate::types::DrawRecord;
use crate::utils::{estimate_draw_date, parse_amount, validate_numbers};

static DRAW_NO_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("#lottoDrwNo").unwrap());
static DRAW_HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h4 strong").unwrap());
static WIN_BALLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".num.win .ball_645").unwrap());
static BONUS_BALLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".num.bonus .ball_645").unwrap());

static DRAW_NO_TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s*회?\s*$").unwrap());
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일\s*추첨").unwrap());
static FIRST_PRIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)1등.*?(\d{1,3}(?:,\d{3})+)").unwrap());
static FIRST_WINNERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)1등.*?(\d[\d,]*)\s*명").unwrap());
static TOTAL_SALES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"총\s*판매금액\D*?(\d[\d,]*)").unwrap());

/// Public results page (`gameResult.do?method=byWin[&drwNo=N]`).
pub struct ScrapeSource {
    client: reqwest::Client,
    url: String,
}

impl ScrapeSource {
    pub fn new(url: String, timeout: Duration) -> reqwest::Result<Self> {
        let client = build_client(timeout, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")?;
        Ok(Self { client, url })
    }

    async fn request_page(&self, draw_no: Option<u32>) -> Result<String, SourceError> {
        let mut query = vec![("method", "byWin".to_string())];
        if let Some(draw_no) = draw_no {
            query.push(("drwNo", draw_no.to_string()));
        }
        let body = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl DrawSource for ScrapeSource {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn fetch_draw(&self, draw_no: u32) -> Option<DrawRecord> {
        let parsed = match self.request_page(Some(draw_no)).await {
            Ok(html) => parse_result_page(&html, draw_no),
            Err(e) => Err(e),
        };
        parsed
            .inspect_err(|e| warn!(draw_no, error = %e, "results page scrape failed"))
            .ok()
    }

    async fn find_latest(&self, _latest_known: Option<u32>) -> Option<u32> {
        let html = self
            .request_page(None)
            .await
            .inspect_err(|e| warn!(error = %e, "current results page unavailable"))
            .ok()?;
        let latest = displayed_draw_no(&html);
        match latest {
            Some(draw_no) => info!(draw_no, "results page shows latest draw"),
            None => warn!("results page carries no draw number"),
        }
        latest
    }
}

/// Draw number shown in the page header.
pub fn displayed_draw_no(html: &str) -> Option<u32> {
    draw_no_in(&Html::parse_document(html))
}

fn draw_no_in(document: &Html) -> Option<u32> {
    [&*DRAW_NO_ID, &*DRAW_HEADING].into_iter().find_map(|selector| {
        document.select(selector).find_map(|el| {
            let text: String = el.text().collect();
            DRAW_NO_TEXT_RE.captures(&text)?[1].parse().ok()
        })
    })
}

fn balls_in(document: &Html, selector: &Selector) -> Vec<u8> {
    document
        .select(selector)
        .filter_map(|el| el.text().collect::<String>().trim().parse().ok())
        .collect()
}

fn captured_amount(re: &Regex, html: &str) -> i64 {
    re.captures(html)
        .and_then(|c| parse_amount(&c[1]))
        .unwrap_or(0)
}

/// Extracts the draw for `requested` from a results page.
///
/// The page must show the requested draw number and six valid winning
/// numbers. Bonus and money fields fall back to 0 when their markup is
/// missing; a missing date phrase falls back to the weekly-cadence estimate.
pub fn parse_result_page(html: &str, requested: u32) -> Result<DrawRecord, SourceError> {
    let document = Html::parse_document(html);
    let found = draw_no_in(&document)
        .ok_or_else(|| SourceError::Malformed("no draw number on page".to_string()))?;
    if found != requested {
        return Err(SourceError::DrawMismatch { requested, found });
    }

    let winning = balls_in(&document, &WIN_BALLS);
    if winning.is_empty() {
        return Err(SourceError::Malformed("no winning-number block".to_string()));
    }
    validate_numbers(&winning).map_err(SourceError::Malformed)?;

    let bonus = balls_in(&document, &BONUS_BALLS).first().copied().unwrap_or(0);

    let stated_date = DATE_RE.captures(html).and_then(|c| {
        NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    });
    let draw_date = match stated_date {
        Some(date) => date,
        None => estimate_draw_date(requested)
            .ok_or_else(|| SourceError::Malformed(format!("no date for draw {}", requested)))?,
    };

    let mut numbers = [0u8; 6];
    numbers.copy_from_slice(&winning);
    numbers.sort_unstable();

    Ok(DrawRecord {
        draw_no: requested,
        draw_date,
        numbers,
        bonus,
        first_prize_amount: captured_amount(&FIRST_PRIZE_RE, html),
        first_prize_winners: captured_amount(&FIRST_WINNERS_RE, html),
        total_sales: captured_amount(&TOTAL_SALES_RE, html),
        second_prize_amount: None,
        second_prize_winners: None,
    })
}
