use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use lotto_draws::database::{get_draw_page, get_draw_with_neighbours};
use lotto_draws::fallback::placeholder_draw;
use lotto_draws::landing::landing_bundle;
use lotto_draws::stats::{current_draw, extended_recommendations, number_detail, recent_draws};
use lotto_draws::{DrawSource, IngestError, StatsError, ingest};

const DEFAULT_RECENT_DRAWS: u32 = 5;
const MAX_RECENT_DRAWS: u32 = 100;
const DEFAULT_EXTENDED_SETS: usize = 10;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl ToolError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) => -32602,
            _ => -32603,
        }
    }
}

impl From<StatsError> for ToolError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::InvalidNumber(_) => ToolError::InvalidParams(e.to_string()),
            StatsError::Store(e) => ToolError::Store(e),
        }
    }
}

type Arguments = HashMap<String, Value>;

/// Integer argument, given either as a JSON number or a numeric string.
fn integer_arg(arguments: &Arguments, key: &str) -> Result<Option<i64>, ToolError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidParams(format!("{} must be an integer", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ToolError::InvalidParams(format!("{} must be an integer", key))),
        Some(_) => Err(ToolError::InvalidParams(format!("{} must be an integer", key))),
    }
}

fn u32_arg(arguments: &Arguments, key: &str) -> Result<Option<u32>, ToolError> {
    integer_arg(arguments, key)?
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| ToolError::InvalidParams(format!("{} must be a positive integer", key)))
        })
        .transpose()
}

/// `date` argument (YYYY-MM-DD), today's local date when absent.
fn day_arg(arguments: &Arguments) -> Result<NaiveDate, ToolError> {
    match arguments.get("date").and_then(|v| v.as_str()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ToolError::InvalidParams(format!("invalid date {:?}, expected YYYY-MM-DD", raw))),
        None => Ok(Local::now().date_naive()),
    }
}

pub struct DrawUseCase {
    connection: Arc<Connection>,
}

impl DrawUseCase {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    pub async fn get_current_draw(&self, _arguments: &Arguments) -> Result<String, ToolError> {
        let (placeholder, draw) = match current_draw(&self.connection)? {
            Some(draw) => (false, draw),
            None => (true, placeholder_draw()),
        };

        Ok(json!({
            "success": true,
            "placeholder": placeholder,
            "draw": draw
        })
        .to_string())
    }

    pub async fn get_recent_draws(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let limit = u32_arg(arguments, "limit")?
            .unwrap_or(DEFAULT_RECENT_DRAWS)
            .clamp(1, MAX_RECENT_DRAWS);
        let results = recent_draws(&self.connection, limit)?;

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }

    pub async fn get_draw(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let draw_no = u32_arg(arguments, "draw_no")?
            .ok_or_else(|| ToolError::InvalidParams("Missing draw_no parameter".to_string()))?;
        let result = get_draw_with_neighbours(&self.connection, draw_no)?;

        Ok(json!({
            "success": true,
            "result": result
        })
        .to_string())
    }

    pub async fn list_draws(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let page = u32_arg(arguments, "page")?.unwrap_or(1);
        let result = get_draw_page(&self.connection, page)?;

        Ok(json!({
            "success": true,
            "result": result
        })
        .to_string())
    }
}

pub struct StatsUseCase {
    connection: Arc<Connection>,
}

impl StatsUseCase {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    pub async fn get_landing_bundle(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let day = day_arg(arguments)?;
        let bundle = landing_bundle(&self.connection, day)?;

        Ok(json!({
            "success": true,
            "result": bundle
        })
        .to_string())
    }

    pub async fn get_number_detail(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let number = integer_arg(arguments, "number")?
            .ok_or_else(|| ToolError::InvalidParams("Missing number parameter".to_string()))?;
        let detail = number_detail(&self.connection, number)?;

        Ok(json!({
            "success": true,
            "result": detail
        })
        .to_string())
    }

    pub async fn get_extended_recommendations(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let day = day_arg(arguments)?;
        let count = u32_arg(arguments, "count")?
            .map(|c| c as usize)
            .unwrap_or(DEFAULT_EXTENDED_SETS);
        let sets = extended_recommendations(&self.connection, day, count)?;

        Ok(json!({
            "success": true,
            "date": day.format("%Y-%m-%d").to_string(),
            "results": sets
        })
        .to_string())
    }
}

pub struct IngestUseCase {
    connection: Arc<Connection>,
    source: Box<dyn DrawSource>,
}

impl IngestUseCase {
    pub fn new(connection: Arc<Connection>, source: Box<dyn DrawSource>) -> Self {
        Self { connection, source }
    }

    pub async fn fetch_latest(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let from = u32_arg(arguments, "from")?;
        let to = u32_arg(arguments, "to")?;
        let outcome = ingest::run(&self.connection, self.source.as_ref(), from, to).await?;

        Ok(json!({
            "success": true,
            "source": self.source.name(),
            "result": outcome
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_integer_arg_accepts_numbers_and_strings() {
        let a = args(json!({ "n": 7, "s": " 12 ", "bad": "x", "f": 1.5 }));
        assert_eq!(integer_arg(&a, "n").unwrap(), Some(7));
        assert_eq!(integer_arg(&a, "s").unwrap(), Some(12));
        assert_eq!(integer_arg(&a, "missing").unwrap(), None);
        assert!(matches!(integer_arg(&a, "bad"), Err(ToolError::InvalidParams(_))));
        assert!(matches!(integer_arg(&a, "f"), Err(ToolError::InvalidParams(_))));
    }

    #[test]
    fn test_u32_arg_rejects_negative() {
        let a = args(json!({ "page": -1 }));
        assert_eq!(u32_arg(&a, "page").unwrap_err().code(), -32602);
    }

    #[test]
    fn test_day_arg() {
        let a = args(json!({ "date": "2024-01-06" }));
        assert_eq!(day_arg(&a).unwrap(), NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert!(day_arg(&args(json!({ "date": "06/01/2024" }))).is_err());
    }

    #[test]
    fn test_stats_error_mapping() {
        assert_eq!(ToolError::from(StatsError::InvalidNumber(46)).code(), -32602);
        let store = StatsError::Store(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(ToolError::from(store).code(), -32603);
    }
}
