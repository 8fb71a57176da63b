//! Error types for ingestion, seeding and statistics.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single draw could not be acquired. Never escapes a `DrawSource`:
/// strategies log it and report the draw as unavailable.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("source reported status {0:?}")]
    NotSuccess(String),

    #[error("page shows draw {found}, requested {requested}")]
    DrawMismatch { requested: u32, found: u32 },

    #[error("malformed draw data: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    /// The newest externally available draw could not be determined.
    #[error("could not determine the latest available draw number")]
    Discovery,

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to open seed file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {path}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {0} has no worksheet")]
    NoWorksheet(PathBuf),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Per-row rejection reasons of the seed loader. Counted as skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing draw number")]
    MissingDrawNo,

    #[error("column {column}: invalid integer {value:?}")]
    InvalidInteger { column: usize, value: String },

    #[error("column {column}: invalid amount {value:?}")]
    InvalidAmount { column: usize, value: String },

    #[error("invalid winning numbers: {0}")]
    InvalidNumbers(String),

    #[error("unreadable row: {0}")]
    Unreadable(String),
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("number {0} is outside 1-45")]
    InvalidNumber(i64),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}
