use lotto_draws::database::{count_draws, upsert_draw};
use lotto_draws::utils::estimate_draw_date;
use lotto_draws::DrawRecord;
use lotto_mcp::connection::conn;
use tempfile::TempDir;

#[test]
fn test_conn_creates_missing_directories_and_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("lotto.db");

    let db = conn(&path).unwrap();
    assert!(path.exists());
    assert_eq!(count_draws(&db).unwrap(), 0);

    upsert_draw(
        &db,
        &DrawRecord {
            draw_no: 1,
            draw_date: estimate_draw_date(1).unwrap(),
            numbers: [10, 23, 29, 33, 37, 40],
            bonus: 16,
            first_prize_amount: 0,
            first_prize_winners: 0,
            total_sales: 0,
            second_prize_amount: None,
            second_prize_winners: None,
        },
    )
    .unwrap();
    drop(db);

    let reopened = conn(&path).unwrap();
    assert_eq!(count_draws(&reopened).unwrap(), 1);
}
