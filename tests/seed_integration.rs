use std::fs;
use std::path::Path;

use lotto_draws::database::{count_draws, get_draw, open_database};
use lotto_draws::seed::{load, load_csv};
use lotto_draws::utils::estimate_draw_date;
use tempfile::TempDir;

const HEADER: &str = "회차,번호1,번호2,번호3,번호4,번호5,번호6,보너스,1등당첨금,1등당첨자수,2등당첨금,2등당첨자수\n";

fn write_csv(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("lotto.csv");
    fs::write(&path, format!("{}{}", HEADER, body)).unwrap();
    path
}

#[test]
fn test_seed_rows_skip_and_amounts() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    let csv_path = write_csv(
        &dir,
        ",1,2,3,4,5,6,7,,,,\n\
         1,10,23,29,33,37,40,16,\"1,234,500\",1,\"143,934,100\",28\n\
         2,9,13,21,25,32,42,2,,0,,\n",
    );

    let report = load_csv(&conn, &csv_path, false).unwrap();
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.created, 2);
    assert_eq!(report.updated, 0);

    let first = get_draw(&conn, 1).unwrap().unwrap();
    assert_eq!(first.first_prize_amount, 1_234_500);
    assert_eq!(first.second_prize_amount, 143_934_100);
    assert_eq!(first.second_prize_winners, 28);
    assert_eq!(Some(first.draw_date), estimate_draw_date(1));

    let second = get_draw(&conn, 2).unwrap().unwrap();
    assert_eq!(second.first_prize_amount, 0);
    assert_eq!(second.numbers(), [9, 13, 21, 25, 32, 42]);
}

#[test]
fn test_seed_is_idempotent_and_clear_resets() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    let csv_path = write_csv(
        &dir,
        "1,10,23,29,33,37,40,16,0,0,0,0\n\
         2,9,13,21,25,32,42,2,2002006800,1,0,0\n",
    );

    let first = load_csv(&conn, &csv_path, false).unwrap();
    assert_eq!((first.created, first.updated), (2, 0));

    let again = load_csv(&conn, &csv_path, false).unwrap();
    assert_eq!((again.created, again.updated), (0, 2));
    assert_eq!(count_draws(&conn).unwrap(), 2);

    let cleared = load_csv(&conn, &csv_path, true).unwrap();
    assert_eq!(cleared.cleared, 2);
    assert_eq!((cleared.created, cleared.updated), (2, 0));
}

#[test]
fn test_seed_unparseable_amount_skips_row_only() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    let csv_path = write_csv(
        &dir,
        "1,10,23,29,33,37,40,16,about a billion,0,0,0\n\
         2,9,13,21,25,32,42,2,2002006800,1,0,0\n",
    );

    let report = load_csv(&conn, &csv_path, false).unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.created, 1);
    assert!(get_draw(&conn, 1).unwrap().is_none());
}

#[test]
fn test_seed_missing_file() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    assert!(load_csv(&conn, &dir.path().join("nope.csv"), false).is_err());
}

#[test]
fn test_seed_workbook_numeric_and_text_amounts() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    let workbook = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/seed_sample.xlsx");

    let report = load(&conn, &workbook, false).unwrap();
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.created, 2);

    let first = get_draw(&conn, 1).unwrap().unwrap();
    assert_eq!(first.numbers(), [10, 23, 29, 33, 37, 40]);
    assert_eq!(first.bonus_number, 16);
    assert_eq!(first.first_prize_amount, 2_002_006_800);
    assert_eq!(first.first_prize_winners, 1);

    let second = get_draw(&conn, 2).unwrap().unwrap();
    assert_eq!(second.first_prize_amount, 1_234_500);
    assert_eq!(second.first_prize_winners, 2);
    assert_eq!(second.second_prize_amount, 0);
}

#[test]
fn test_seed_draw_number_beyond_calendar_skips_row() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    let csv_path = write_csv(
        &dir,
        "20240106,1,2,3,4,5,6,7,0,0,0,0
         1,10,23,29,33,37,40,16,0,0,0,0
",
    );

    let report = load(&conn, &csv_path, false).unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.created, 1);
    assert_eq!(count_draws(&conn).unwrap(), 1);
}
