//! Bulk backfill from the results spreadsheet (`.xlsx`) or a CSV export of it.
//!
//! Columns are positional: draw number, six winning numbers, bonus,
//! first-prize amount, first-prize winners, second-prize amount,
//! second-prize winners. The first row is a header. The sheet has no usable
//! date column, so every draw date is estimated from its number.

use calamine::{Data, Reader, open_workbook_auto};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::database::{clear_draws, upsert_draw};
use crate::error::{RowError, SeedError};
use crate::types::{DrawRecord, UpsertOutcome};
use crate::utils::{estimate_draw_date, is_valid_number, parse_amount, validate_numbers};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub cleared: usize,
    pub total_rows: u32,
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
}

/// One spreadsheet cell. Workbooks keep numeric cells typed; CSV gives text.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedCell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl SeedCell {
    fn from_text(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            SeedCell::Empty
        } else {
            SeedCell::Text(raw.to_string())
        }
    }

    fn display(&self) -> String {
        match self {
            SeedCell::Empty => String::new(),
            SeedCell::Int(v) => v.to_string(),
            SeedCell::Float(v) => v.to_string(),
            SeedCell::Text(s) => s.clone(),
        }
    }
}

impl From<&Data> for SeedCell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => SeedCell::Empty,
            Data::Int(v) => SeedCell::Int(*v),
            Data::Float(v) => SeedCell::Float(*v),
            Data::String(s) => SeedCell::from_text(s),
            other => SeedCell::from_text(&other.to_string()),
        }
    }
}

static EMPTY_CELL: SeedCell = SeedCell::Empty;

fn cell(cells: &[SeedCell], idx: usize) -> &SeedCell {
    cells.get(idx).unwrap_or(&EMPTY_CELL)
}

/// Whole-number text; tolerates separators and a `.0` suffix from numeric exports.
fn parse_int(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }
    cleaned.parse::<f64>().ok().and_then(whole_float)
}

fn whole_float(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

fn int_value(cell: &SeedCell) -> Option<i64> {
    match cell {
        SeedCell::Empty => None,
        SeedCell::Int(v) => Some(*v),
        SeedCell::Float(v) => whole_float(*v),
        SeedCell::Text(s) => parse_int(s),
    }
}

fn invalid_integer(idx: usize, cell: &SeedCell) -> RowError {
    RowError::InvalidInteger {
        column: idx,
        value: cell.display(),
    }
}

fn number_cell(cells: &[SeedCell], idx: usize) -> Result<u8, RowError> {
    let c = cell(cells, idx);
    int_value(c)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| invalid_integer(idx, c))
}

/// Money cell: absent or empty is 0, anything unparseable rejects the row.
fn amount_cell(cells: &[SeedCell], idx: usize) -> Result<i64, RowError> {
    let c = cell(cells, idx);
    let amount = match c {
        SeedCell::Empty => Some(0),
        SeedCell::Int(v) => Some(*v),
        SeedCell::Float(v) => v.is_finite().then(|| v.trunc() as i64),
        SeedCell::Text(s) => parse_amount(s),
    };
    amount.ok_or_else(|| RowError::InvalidAmount {
        column: idx,
        value: c.display(),
    })
}

fn count_cell(cells: &[SeedCell], idx: usize) -> Result<i64, RowError> {
    let c = cell(cells, idx);
    if *c == SeedCell::Empty {
        return Ok(0);
    }
    int_value(c).ok_or_else(|| invalid_integer(idx, c))
}

/// Converts one spreadsheet row into a draw record.
pub fn parse_row(cells: &[SeedCell]) -> Result<DrawRecord, RowError> {
    let raw_draw_no = cell(cells, 0);
    if *raw_draw_no == SeedCell::Empty {
        return Err(RowError::MissingDrawNo);
    }
    let draw_no = int_value(raw_draw_no)
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| invalid_integer(0, raw_draw_no))?;
    let draw_date = estimate_draw_date(draw_no).ok_or_else(|| invalid_integer(0, raw_draw_no))?;

    let mut numbers = [0u8; 6];
    for (slot, idx) in numbers.iter_mut().zip(1..=6) {
        *slot = number_cell(cells, idx)?;
    }
    validate_numbers(&numbers).map_err(RowError::InvalidNumbers)?;
    numbers.sort_unstable();

    let bonus = number_cell(cells, 7)?;
    if !is_valid_number(bonus) {
        return Err(RowError::InvalidNumbers(format!("bonus {} out of range", bonus)));
    }

    Ok(DrawRecord {
        draw_no,
        draw_date,
        numbers,
        bonus,
        first_prize_amount: amount_cell(cells, 8)?,
        first_prize_winners: count_cell(cells, 9)?,
        total_sales: 0,
        second_prize_amount: Some(amount_cell(cells, 10)?),
        second_prize_winners: Some(count_cell(cells, 11)?),
    })
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm" | "xls" | "ods"))
}

/// Loads `path`, picking the workbook or CSV reader by file extension.
pub fn load(conn: &Connection, path: &Path, clear: bool) -> Result<SeedReport, SeedError> {
    if is_workbook(path) {
        load_xlsx(conn, path, clear)
    } else {
        load_csv(conn, path, clear)
    }
}

/// Loads the first worksheet of a workbook.
pub fn load_xlsx(conn: &Connection, path: &Path, clear: bool) -> Result<SeedReport, SeedError> {
    let workbook_error = |source| SeedError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SeedError::NoWorksheet(path.to_path_buf()))?
        .map_err(workbook_error)?;

    let rows = range
        .rows()
        .skip(1)
        .map(|row| Ok(row.iter().map(SeedCell::from).collect::<Vec<_>>()));
    load_rows(conn, path, clear, rows)
}

/// Loads a CSV export of the spreadsheet.
pub fn load_csv(conn: &Connection, path: &Path, clear: bool) -> Result<SeedReport, SeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| SeedError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let rows = reader.records().map(|record| {
        record
            .map(|r| r.iter().map(SeedCell::from_text).collect::<Vec<_>>())
            .map_err(|e| RowError::Unreadable(e.to_string()))
    });
    load_rows(conn, path, clear, rows)
}

/// Upserts every well-formed row in a single transaction; malformed rows
/// are skipped and counted.
fn load_rows<I>(conn: &Connection, path: &Path, clear: bool, rows: I) -> Result<SeedReport, SeedError>
where
    I: Iterator<Item = Result<Vec<SeedCell>, RowError>>,
{
    let tx = conn.unchecked_transaction()?;
    let mut report = SeedReport::default();

    if clear {
        report.cleared = clear_draws(&tx)?;
    }

    info!(path = %path.display(), "loading seed file");

    for (line, row) in rows.enumerate() {
        report.total_rows += 1;
        // header is line 1
        let line = line + 2;

        match row.and_then(|cells| parse_row(&cells)) {
            Ok(draw) => match upsert_draw(&tx, &draw)? {
                UpsertOutcome::Created => report.created += 1,
                UpsertOutcome::Updated => report.updated += 1,
            },
            Err(RowError::MissingDrawNo) => {
                debug!(line, "row without draw number skipped");
                report.skipped += 1;
            }
            Err(e) => {
                warn!(line, error = %e, "seed row skipped");
                report.skipped += 1;
            }
        }
    }

    tx.commit()?;
    info!(
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        "seed load finished"
    );
    Ok(report)
}
