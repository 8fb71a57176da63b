use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use lotto_draws::database::{count_draws, get_all_draws, get_draw, open_database, upsert_draw};
use lotto_draws::ingest::{IngestOutcome, run};
use lotto_draws::stats::frequency::frequency_table;
use lotto_draws::utils::estimate_draw_date;
use lotto_draws::{DrawRecord, DrawSource, IngestError};
use tempfile::TempDir;

/// Serves a fixed catalogue of draws and records every request.
struct CatalogueSource {
    draws: BTreeMap<u32, DrawRecord>,
    requests: Mutex<Vec<u32>>,
}

impl CatalogueSource {
    fn with_draws(range: std::ops::RangeInclusive<u32>) -> Self {
        let draws = range.map(|n| (n, draw(n))).collect();
        Self {
            draws,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}

fn draw(draw_no: u32) -> DrawRecord {
    let b = (draw_no % 30) as u8 + 1;
    DrawRecord {
        draw_no,
        draw_date: estimate_draw_date(draw_no).unwrap(),
        // deliberately unsorted
        numbers: [b + 14, b, b + 7, b + 3, b + 10, b + 1],
        bonus: 45,
        first_prize_amount: 1_500_000_000,
        first_prize_winners: 9,
        total_sales: 100_000_000_000,
        second_prize_amount: None,
        second_prize_winners: None,
    }
}

#[async_trait]
impl DrawSource for CatalogueSource {
    fn name(&self) -> &str {
        "catalogue"
    }

    async fn fetch_draw(&self, draw_no: u32) -> Option<DrawRecord> {
        self.requests.lock().unwrap().push(draw_no);
        self.draws.get(&draw_no).cloned()
    }

    async fn find_latest(&self, latest_known: Option<u32>) -> Option<u32> {
        self.draws.keys().next_back().copied().or(latest_known)
    }
}

#[tokio::test]
async fn test_full_sync_then_resume() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();

    let first = CatalogueSource::with_draws(1..=12);
    let outcome = run(&conn, &first, None, None).await.unwrap();
    let IngestOutcome::Completed(report) = outcome else {
        panic!("expected completed run");
    };
    assert_eq!(report.created, 12);
    assert_eq!(report.failed, 0);

    let second = CatalogueSource::with_draws(1..=15);
    run(&conn, &second, None, None).await.unwrap();
    assert_eq!(second.requests(), vec![13, 14, 15]);
    assert_eq!(count_draws(&conn).unwrap(), 15);

    let third = CatalogueSource::with_draws(1..=15);
    let outcome = run(&conn, &third, None, None).await.unwrap();
    assert!(matches!(outcome, IngestOutcome::UpToDate { from: 16, to: 15 }));
    assert!(third.requests().is_empty());
}

#[tokio::test]
async fn test_stored_draws_are_sorted_and_in_range() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    run(&conn, &CatalogueSource::with_draws(1..=40), Some(1), Some(40))
        .await
        .unwrap();

    for stored in get_all_draws(&conn).unwrap() {
        let numbers = stored.numbers();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        assert!(numbers.iter().all(|n| (1..=45).contains(n)));
        assert!((1..=45).contains(&stored.bonus_number));
        assert_eq!(
            [stored.number_1, stored.number_2, stored.number_3, stored.number_4, stored.number_5, stored.number_6],
            numbers
        );
    }
}

#[tokio::test]
async fn test_gaps_are_retried_by_next_run() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();

    let mut flaky = CatalogueSource::with_draws(1..=6);
    flaky.draws.remove(&4);
    let outcome = run(&conn, &flaky, Some(1), Some(6)).await.unwrap();
    let IngestOutcome::Completed(report) = outcome else {
        panic!("expected completed run");
    };
    assert_eq!(report.failed_draws, vec![4]);
    assert!(get_draw(&conn, 4).unwrap().is_none());

    let healthy = CatalogueSource::with_draws(1..=6);
    run(&conn, &healthy, Some(4), Some(4)).await.unwrap();
    assert!(get_draw(&conn, 4).unwrap().is_some());
    assert_eq!(count_draws(&conn).unwrap(), 6);
}

#[tokio::test]
async fn test_discovery_failure_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    let empty = CatalogueSource::with_draws(1..=0);

    let err = run(&conn, &empty, None, None).await.unwrap_err();
    assert!(matches!(err, IngestError::Discovery));
    assert_eq!(count_draws(&conn).unwrap(), 0);
}

#[test]
fn test_frequency_table_covers_all_numbers_after_upserts() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("lotto.db")).unwrap();
    for n in 1..=3 {
        upsert_draw(&conn, &draw(n)).unwrap();
    }
    let table = frequency_table(&get_all_draws(&conn).unwrap());
    assert_eq!(table.len(), 45);
    assert!(table.values().all(|f| f.freq_10 <= 3 && f.freq_total <= 3));
}
