use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::types::{DrawPage, DrawRecord, DrawResultRow, DrawWithNeighbours, UpsertOutcome};

pub const PAGE_SIZE: u32 = 20;

const DRAW_COLUMNS: &str = "draw_no, draw_date, number_1, number_2, number_3, number_4, number_5, \
     number_6, bonus_number, first_prize_amount, first_prize_winners, total_sales, \
     second_prize_amount, second_prize_winners, created_at";

/// Opens (creating if needed) the on-disk store and its parent directory.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                Some(format!("Failed to create directory {}: {}", parent.display(), e)),
            )
        })?;
    }

    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    info!(path = %path.display(), "draw store ready");
    Ok(conn)
}

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS draw_results (
            draw_no INTEGER PRIMARY KEY CHECK (draw_no > 0),
            draw_date TEXT NOT NULL,
            number_1 INTEGER NOT NULL,
            number_2 INTEGER NOT NULL,
            number_3 INTEGER NOT NULL,
            number_4 INTEGER NOT NULL,
            number_5 INTEGER NOT NULL,
            number_6 INTEGER NOT NULL,
            bonus_number INTEGER NOT NULL,
            first_prize_amount INTEGER NOT NULL DEFAULT 0,
            first_prize_winners INTEGER NOT NULL DEFAULT 0,
            total_sales INTEGER NOT NULL DEFAULT 0,
            second_prize_amount INTEGER NOT NULL DEFAULT 0,
            second_prize_winners INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );",
    )
}

fn row_to_draw(row: &Row<'_>) -> Result<DrawResultRow> {
    Ok(DrawResultRow {
        draw_no: row.get(0)?,
        draw_date: row.get(1)?,
        number_1: row.get(2)?,
        number_2: row.get(3)?,
        number_3: row.get(4)?,
        number_4: row.get(5)?,
        number_5: row.get(6)?,
        number_6: row.get(7)?,
        bonus_number: row.get(8)?,
        first_prize_amount: row.get(9)?,
        first_prize_winners: row.get(10)?,
        total_sales: row.get(11)?,
        second_prize_amount: row.get(12)?,
        second_prize_winners: row.get(13)?,
        created_at: row.get::<_, Option<String>>(14)?.unwrap_or_default(),
    })
}

pub fn draw_exists(conn: &Connection, draw_no: u32) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT COUNT(*) FROM draw_results WHERE draw_no = ?1")?;
    let count: i64 = stmt.query_row([draw_no], |row| row.get(0))?;
    Ok(count > 0)
}

/// Inserts or overwrites the draw keyed on `draw_no`.
///
/// Winning numbers are written sorted. `created_at` survives updates, and
/// second-prize figures are only replaced when the record carries them.
pub fn upsert_draw(conn: &Connection, record: &DrawRecord) -> Result<UpsertOutcome> {
    let existed = draw_exists(conn, record.draw_no)?;
    let nums = record.sorted_numbers();

    conn.execute(
        "INSERT INTO draw_results (
            draw_no, draw_date, number_1, number_2, number_3, number_4, number_5, number_6,
            bonus_number, first_prize_amount, first_prize_winners, total_sales,
            second_prize_amount, second_prize_winners
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, COALESCE(?13, 0), COALESCE(?14, 0))
        ON CONFLICT(draw_no) DO UPDATE SET
            draw_date = excluded.draw_date,
            number_1 = excluded.number_1,
            number_2 = excluded.number_2,
            number_3 = excluded.number_3,
            number_4 = excluded.number_4,
            number_5 = excluded.number_5,
            number_6 = excluded.number_6,
            bonus_number = excluded.bonus_number,
            first_prize_amount = excluded.first_prize_amount,
            first_prize_winners = excluded.first_prize_winners,
            total_sales = excluded.total_sales,
            second_prize_amount = COALESCE(?13, draw_results.second_prize_amount),
            second_prize_winners = COALESCE(?14, draw_results.second_prize_winners)",
        params![
            record.draw_no,
            record.draw_date,
            nums[0],
            nums[1],
            nums[2],
            nums[3],
            nums[4],
            nums[5],
            record.bonus,
            record.first_prize_amount,
            record.first_prize_winners,
            record.total_sales,
            record.second_prize_amount,
            record.second_prize_winners,
        ],
    )?;

    let outcome = if existed {
        UpsertOutcome::Updated
    } else {
        UpsertOutcome::Created
    };
    debug!(draw_no = record.draw_no, ?outcome, "draw upserted");
    Ok(outcome)
}

/// Highest stored draw number, `None` for an empty store.
pub fn max_draw_no(conn: &Connection) -> Result<Option<u32>> {
    conn.query_row("SELECT MAX(draw_no) FROM draw_results", [], |row| {
        row.get::<_, Option<u32>>(0)
    })
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    conn.query_row("SELECT COUNT(*) FROM draw_results", [], |row| row.get(0))
}

/// Deletes every stored draw and returns how many were removed.
pub fn clear_draws(conn: &Connection) -> Result<usize> {
    let removed = conn.execute("DELETE FROM draw_results", [])?;
    info!(removed, "draw store cleared");
    Ok(removed)
}

pub fn get_draw(conn: &Connection, draw_no: u32) -> Result<Option<DrawResultRow>> {
    let sql = format!("SELECT {} FROM draw_results WHERE draw_no = ?1", DRAW_COLUMNS);
    let mut stmt = conn.prepare_cached(&sql)?;
    stmt.query_row([draw_no], row_to_draw).optional()
}

pub fn get_latest_draw(conn: &Connection) -> Result<Option<DrawResultRow>> {
    Ok(get_recent_draws(conn, 1)?.into_iter().next())
}

/// The `limit` most recent draws, newest first.
pub fn get_recent_draws(conn: &Connection, limit: u32) -> Result<Vec<DrawResultRow>> {
    let sql = format!(
        "SELECT {} FROM draw_results ORDER BY draw_no DESC LIMIT ?1",
        DRAW_COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let draw_iter = stmt.query_map([limit], row_to_draw)?;

    let mut results = Vec::new();
    for draw in draw_iter {
        results.push(draw?);
    }
    Ok(results)
}

/// Every stored draw, newest first.
pub fn get_all_draws(conn: &Connection) -> Result<Vec<DrawResultRow>> {
    let sql = format!("SELECT {} FROM draw_results ORDER BY draw_no DESC", DRAW_COLUMNS);
    let mut stmt = conn.prepare_cached(&sql)?;
    let draw_iter = stmt.query_map([], row_to_draw)?;

    let mut results = Vec::new();
    for draw in draw_iter {
        results.push(draw?);
    }
    Ok(results)
}

/// One page of the draw listing, newest first. Pages start at 1.
pub fn get_draw_page(conn: &Connection, page: u32) -> Result<DrawPage> {
    let total_draws = count_draws(conn)?;
    let total_pages = total_draws.div_ceil(PAGE_SIZE).max(1);
    let page = page.clamp(1, total_pages);
    let offset = (page - 1) * PAGE_SIZE;

    let sql = format!(
        "SELECT {} FROM draw_results ORDER BY draw_no DESC LIMIT ?1 OFFSET ?2",
        DRAW_COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let draw_iter = stmt.query_map([PAGE_SIZE, offset], row_to_draw)?;

    let mut draws = Vec::new();
    for draw in draw_iter {
        draws.push(draw?.summary());
    }

    Ok(DrawPage {
        page,
        total_pages,
        total_draws,
        draws,
    })
}

/// A draw with the stored draws immediately before and after it.
pub fn get_draw_with_neighbours(
    conn: &Connection,
    draw_no: u32,
) -> Result<Option<DrawWithNeighbours>> {
    let Some(draw) = get_draw(conn, draw_no)? else {
        return Ok(None);
    };
    let prev_draw = match draw_no.checked_sub(1) {
        Some(prev) if prev > 0 => get_draw(conn, prev)?.map(|d| d.summary()),
        _ => None,
    };
    let next_draw = match draw_no.checked_add(1) {
        Some(next) => get_draw(conn, next)?.map(|d| d.summary()),
        None => None,
    };

    Ok(Some(DrawWithNeighbours {
        draw: draw.summary(),
        prev_draw,
        next_draw,
    }))
}
