//! Range ingestion: fetch every missing draw from a source and upsert it.

use rusqlite::Connection;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::database::{max_draw_no, upsert_draw};
use crate::error::IngestError;
use crate::source::DrawSource;
use crate::types::UpsertOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub from: u32,
    pub to: u32,
    pub created: u32,
    pub updated: u32,
    pub failed: u32,
    pub failed_draws: Vec<u32>,
}

impl IngestReport {
    pub fn saved(&self) -> u32 {
        self.created + self.updated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// `from` is already past `to`; nothing was fetched.
    UpToDate { from: u32, to: u32 },
    Completed(IngestReport),
}

/// Resolves the effective range and ingests it, oldest draw first.
///
/// Unspecified `from` starts right after the newest stored draw (or at 1).
/// Unspecified `to` asks the source for its latest draw; failing that the
/// whole run aborts before touching the store. A draw the source cannot
/// deliver is counted as failed and left for a later run.
pub async fn run(
    conn: &Connection,
    source: &dyn DrawSource,
    from: Option<u32>,
    to: Option<u32>,
) -> Result<IngestOutcome, IngestError> {
    let latest_stored = max_draw_no(conn)?;
    let from = from.unwrap_or_else(|| latest_stored.map_or(1, |n| n.saturating_add(1))).max(1);

    let to = match to {
        Some(to) => to,
        None => match source.find_latest(latest_stored).await {
            Some(latest) => latest,
            None => {
                error!(source = source.name(), "latest draw discovery failed");
                return Err(IngestError::Discovery);
            }
        },
    };

    if from > to {
        info!(from, to, "draw store already up to date");
        return Ok(IngestOutcome::UpToDate { from, to });
    }

    info!(from, to, source = source.name(), "ingesting draws");
    let mut report = IngestReport {
        from,
        to,
        ..Default::default()
    };

    for draw_no in from..=to {
        match source.fetch_draw(draw_no).await {
            Some(record) => {
                match upsert_draw(conn, &record)? {
                    UpsertOutcome::Created => report.created += 1,
                    UpsertOutcome::Updated => report.updated += 1,
                }
                info!(draw_no, "draw saved");
            }
            None => {
                report.failed += 1;
                report.failed_draws.push(draw_no);
                warn!(draw_no, "draw unavailable, skipped");
            }
        }
    }

    info!(
        created = report.created,
        updated = report.updated,
        failed = report.failed,
        "ingestion finished"
    );
    Ok(IngestOutcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::{memory_db, record};
    use crate::database::{count_draws, get_draw};
    use crate::types::DrawRecord;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    struct ScriptedSource {
        available: BTreeSet<u32>,
        latest: Option<u32>,
        fetched: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(available: impl IntoIterator<Item = u32>, latest: Option<u32>) -> Self {
            Self {
                available: available.into_iter().collect(),
                latest,
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<u32> {
            self.fetched.lock().unwrap().clone()
        }
    }

    fn numbers_for(draw_no: u32) -> [u8; 6] {
        let base = (draw_no % 39) as u8 + 1;
        [base, base + 1, base + 2, base + 3, base + 4, base + 5]
    }

    #[async_trait]
    impl DrawSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_draw(&self, draw_no: u32) -> Option<DrawRecord> {
            self.fetched.lock().unwrap().push(draw_no);
            self.available
                .contains(&draw_no)
                .then(|| record(draw_no, numbers_for(draw_no), 45))
        }

        async fn find_latest(&self, _latest_known: Option<u32>) -> Option<u32> {
            self.latest
        }
    }

    #[tokio::test]
    async fn test_empty_store_partial_availability() {
        let conn = memory_db();
        let source = ScriptedSource::new(1..=3, None);

        let outcome = run(&conn, &source, None, Some(5)).await.unwrap();
        let IngestOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!((report.from, report.to), (1, 5));
        assert_eq!(report.created, 3);
        assert_eq!(report.saved(), 3);
        assert_eq!(report.failed, 2);
        assert_eq!(report.failed_draws, vec![4, 5]);
        assert_eq!(source.fetched(), vec![1, 2, 3, 4, 5]);
        assert_eq!(count_draws(&conn).unwrap(), 3);
        assert!(get_draw(&conn, 4).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_already_up_to_date() {
        let conn = memory_db();
        upsert_draw(&conn, &record(10, numbers_for(10), 45)).unwrap();
        let source = ScriptedSource::new(1..=10, Some(10));

        let outcome = run(&conn, &source, None, None).await.unwrap();
        assert_eq!(outcome, IngestOutcome::UpToDate { from: 11, to: 10 });
        assert!(source.fetched().is_empty());
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_discovery_failure_aborts() {
        let conn = memory_db();
        let source = ScriptedSource::new(1..=3, None);

        let err = run(&conn, &source, None, None).await.unwrap_err();
        assert!(matches!(err, IngestError::Discovery));
        assert!(source.fetched().is_empty());
        assert_eq!(count_draws(&conn).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_from_defaults_past_latest_stored() {
        let conn = memory_db();
        upsert_draw(&conn, &record(7, numbers_for(7), 45)).unwrap();
        let source = ScriptedSource::new(1..=9, Some(9));

        run(&conn, &source, None, None).await.unwrap();
        assert_eq!(source.fetched(), vec![8, 9]);
    }

    #[tokio::test]
    async fn test_overlapping_ranges_match_single_run() {
        let once = memory_db();
        let twice = memory_db();
        let source = ScriptedSource::new(1..=8, None);

        run(&once, &source, Some(1), Some(8)).await.unwrap();
        run(&twice, &source, Some(1), Some(5)).await.unwrap();
        let outcome = run(&twice, &source, Some(1), Some(8)).await.unwrap();

        let IngestOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(report.updated, 5);
        assert_eq!(report.created, 3);
        assert_eq!(count_draws(&twice).unwrap(), 8);
        for draw_no in 1..=8 {
            assert_eq!(
                get_draw(&once, draw_no).unwrap().map(|d| d.numbers()),
                get_draw(&twice, draw_no).unwrap().map(|d| d.numbers())
            );
        }
    }

    #[tokio::test]
    async fn test_highest_draw_number_does_not_overflow() {
        let conn = memory_db();
        upsert_draw(&conn, &record(u32::MAX, numbers_for(u32::MAX), 45)).unwrap();
        let source = ScriptedSource::new([u32::MAX], Some(u32::MAX));

        let outcome = run(&conn, &source, None, None).await.unwrap();
        let IngestOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!((report.from, report.to), (u32::MAX, u32::MAX));
        assert_eq!(report.updated, 1);
        assert_eq!(source.fetched(), vec![u32::MAX]);
    }
}
