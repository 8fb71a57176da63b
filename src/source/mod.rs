//! Acquisition of draw results from the lottery operator.
//!
//! Two interchangeable strategies implement [`DrawSource`]: the structured
//! JSON endpoint ([`api::ApiSource`]) and the public results page
//! ([`scrape::ScrapeSource`]). Any per-draw failure is logged and reported
//! as `None` so a range fetch can move on to the next draw.

pub mod api;
pub mod scrape;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::types::DrawRecord;

pub use api::ApiSource;
pub use scrape::ScrapeSource;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const RESULT_REFERER: &str = "https://www.dhlottery.co.kr/gameResult.do?method=byWin";

#[async_trait]
pub trait DrawSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches one draw, `None` when it is unavailable for any reason.
    async fn fetch_draw(&self, draw_no: u32) -> Option<DrawRecord>;

    /// Newest draw number the source can serve. `latest_known` is the
    /// highest draw already stored, if any.
    async fn find_latest(&self, latest_known: Option<u32>) -> Option<u32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Api,
    Scrape,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(SourceKind::Api),
            "scrape" | "html" => Ok(SourceKind::Scrape),
            other => Err(format!("unknown draw source '{}', expected api or scrape", other)),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Api => f.write_str("api"),
            SourceKind::Scrape => f.write_str("scrape"),
        }
    }
}

/// HTTP client with browser-like headers; the operator rejects bare clients.
pub fn build_client(timeout: Duration, accept: &'static str) -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static(RESULT_REFERER));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
}

/// Builds the strategy selected by `kind`.
pub fn from_config(config: &Config, kind: SourceKind) -> reqwest::Result<Box<dyn DrawSource>> {
    let timeout = Duration::from_secs(config.http_timeout_secs);
    Ok(match kind {
        SourceKind::Api => Box::new(ApiSource::new(config.api_url.clone(), timeout)?),
        SourceKind::Scrape => Box::new(ScrapeSource::new(config.result_page_url.clone(), timeout)?),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("api".parse::<SourceKind>().unwrap(), SourceKind::Api);
        assert_eq!(" SCRAPE ".parse::<SourceKind>().unwrap(), SourceKind::Scrape);
        assert_eq!("html".parse::<SourceKind>().unwrap(), SourceKind::Scrape);
        assert!("ftp".parse::<SourceKind>().is_err());
        assert_eq!(SourceKind::Scrape.to_string(), "scrape");
    }
}
