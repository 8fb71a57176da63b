use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::source::SourceKind;

pub const DEFAULT_DB_PATH: &str = "data/lotto.db";
pub const DEFAULT_API_URL: &str = "https://www.dhlottery.co.kr/common.do";
pub const DEFAULT_RESULT_PAGE_URL: &str = "https://www.dhlottery.co.kr/gameResult.do";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub source: SourceKind,
    pub api_url: String,
    pub result_page_url: String,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            source: SourceKind::Api,
            api_url: DEFAULT_API_URL.to_string(),
            result_page_url: DEFAULT_RESULT_PAGE_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

pub fn load() -> Result<Config> {
    from_lookup(|key| env::var(key).ok())
}

/// Builds the config from any key lookup; `load` passes the process environment.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let source = match lookup("LOTTO_SOURCE") {
        Some(raw) => raw
            .parse::<SourceKind>()
            .map_err(anyhow::Error::msg)
            .context("invalid LOTTO_SOURCE")?,
        None => defaults.source,
    };

    let http_timeout_secs = match lookup("LOTTO_HTTP_TIMEOUT_SECS") {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .with_context(|| format!("invalid LOTTO_HTTP_TIMEOUT_SECS: {:?}", raw))?,
        None => defaults.http_timeout_secs,
    };

    Ok(Config {
        database_path: lookup("LOTTO_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path),
        source,
        api_url: lookup("LOTTO_API_URL").unwrap_or(defaults.api_url),
        result_page_url: lookup("LOTTO_RESULT_PAGE_URL").unwrap_or(defaults.result_page_url),
        http_timeout_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.source, SourceKind::Api);
        assert_eq!(config.http_timeout_secs, 15);
    }

    #[test]
    fn test_overrides() {
        let config = from_lookup(lookup_from(&[
            ("LOTTO_DB_PATH", "/tmp/lotto.db"),
            ("LOTTO_SOURCE", "scrape"),
            ("LOTTO_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/lotto.db"));
        assert_eq!(config.source, SourceKind::Scrape);
        assert_eq!(config.http_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_values() {
        assert!(from_lookup(lookup_from(&[("LOTTO_SOURCE", "carrier-pigeon")])).is_err());
        assert!(from_lookup(lookup_from(&[("LOTTO_HTTP_TIMEOUT_SECS", "0")])).is_err());
        assert!(from_lookup(lookup_from(&[("LOTTO_HTTP_TIMEOUT_SECS", "soon")])).is_err());
    }
}
