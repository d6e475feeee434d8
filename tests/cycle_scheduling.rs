//! Cycle scheduling integration tests
//!
//! Drives the CycleRunner against a real SQLite history with fake source,
//! model and memory store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{FakeMemory, FakeModel, FakeSource, candidate, date, runner, test_config};
use curatr::cycle::CycleOutcome;
use curatr::domain::{CycleId, CycleRecord, CycleWindow};
use curatr::error::{CuratrError, Result};
use curatr::scoring::ScoreError;
use curatr::store::{Claim, RunHistory, SqliteRunHistory};
use tempfile::TempDir;

fn relevant_source() -> Arc<FakeSource> {
    FakeSource::new(vec![
        candidate("2602.00001", "LLM reasoning benchmarks", &["Jane Doe"]),
        candidate("2602.00002", "Soil chemistry", &["Ana Ruiz"]),
        candidate("2602.00003", "Transformer memory", &["Yoshua Bengio"]),
    ])
}

fn seed(history: &SqliteRunHistory, anchor: &str, since: &str, until: &str) -> Result<()> {
    let window = CycleWindow::new(date(anchor), date(since), date(until));
    history.insert(&CycleRecord::completed(&window, 100, 25, Utc::now()))
}

/// A second invocation in the same period makes no external calls and writes nothing.
#[tokio::test]
async fn test_second_run_is_noop() -> Result<()> {
    let temp = TempDir::new()?;
    let history = Arc::new(SqliteRunHistory::open(&temp.path().join("pipeline.db"))?);
    let source = relevant_source();
    let model = FakeModel::constant(6);
    let memory = FakeMemory::new();
    let runner = runner(test_config(), &history, &source, &model, &memory);

    let first = runner.run(date("2026-02-17")).await?;
    assert!(matches!(first, CycleOutcome::Completed { .. }));
    let (calls, stored) = (model.calls(), memory.stored());

    let second = runner.run(date("2026-02-20")).await?;
    match second {
        CycleOutcome::AlreadyCompleted(cycle_id) => assert_eq!(cycle_id.as_str(), "2026-02-15"),
        other => panic!("expected AlreadyCompleted, got {:?}", other),
    }

    assert_eq!(source.calls(), 1);
    assert_eq!(model.calls(), calls);
    assert_eq!(memory.stored(), stored);
    assert_eq!(history.list()?.len(), 1);
    Ok(())
}

/// History survives reopening the database file.
#[tokio::test]
async fn test_history_persists_across_reopen() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("pipeline.db");

    {
        let history = Arc::new(SqliteRunHistory::open(&path)?);
        let runner = runner(test_config(), &history, &relevant_source(), &FakeModel::constant(5), &FakeMemory::new());
        runner.run(date("2026-02-17")).await?;
    }

    let history = Arc::new(SqliteRunHistory::open(&path)?);
    let source = relevant_source();
    let runner = runner(test_config(), &history, &source, &FakeModel::constant(5), &FakeMemory::new());
    assert!(matches!(runner.run(date("2026-02-18")).await?, CycleOutcome::AlreadyCompleted(_)));
    assert_eq!(source.calls(), 0);
    Ok(())
}

/// A late run covers every day since the last completed anchor.
#[tokio::test]
async fn test_late_run_covers_gap() -> Result<()> {
    let history = Arc::new(SqliteRunHistory::open_in_memory()?);
    seed(&history, "2026-01-15", "2026-01-02", "2026-01-15")?;

    let source = relevant_source();
    let runner = runner(test_config(), &history, &source, &FakeModel::constant(5), &FakeMemory::new());

    match runner.run(date("2026-02-17")).await? {
        CycleOutcome::Completed { record, .. } => {
            assert_eq!(record.cycle_id.as_str(), "2026-02-15");
            assert_eq!(record.since_date, date("2026-01-16"));
            assert_eq!(record.until_date, date("2026-02-17"));
        }
        other => panic!("expected Completed, got {:?}", other),
    }

    // The next cycle starts the day after the anchor just recorded
    runner.run(date("2026-03-02")).await?;
    let windows = source.windows.lock().unwrap().clone();
    assert_eq!(windows[0], (date("2026-01-16"), date("2026-02-17")));
    assert_eq!(windows[1], (date("2026-02-16"), date("2026-03-02")));

    let ids: Vec<_> = history.list()?.into_iter().map(|r| r.cycle_id.to_string()).collect();
    assert_eq!(ids, vec!["2026-01-15", "2026-02-15", "2026-03-01"]);
    Ok(())
}

/// History ahead of today produces an empty window: no fetch, no record.
#[tokio::test]
async fn test_empty_window_is_not_recorded() -> Result<()> {
    let history = Arc::new(SqliteRunHistory::open_in_memory()?);
    seed(&history, "2026-02-15", "2026-02-02", "2026-02-15")?;

    let source = relevant_source();
    let runner = runner(test_config(), &history, &source, &FakeModel::constant(5), &FakeMemory::new());

    let outcome = runner.run(date("2026-02-10")).await?;
    assert!(matches!(outcome, CycleOutcome::Empty { .. }));
    assert_eq!(source.calls(), 0);
    assert_eq!(history.list()?.len(), 1);
    Ok(())
}

/// A failed memory write leaves no record and the same cycle runs again next time.
#[tokio::test]
async fn test_memory_failure_leaves_cycle_unrecorded() -> Result<()> {
    let history = Arc::new(SqliteRunHistory::open_in_memory()?);
    let source = relevant_source();
    let model = FakeModel::constant(7);

    let failing = runner(test_config(), &history, &source, &model, &FakeMemory::failing_at(1));
    let err = failing.run(date("2026-02-17")).await.unwrap_err();
    assert!(matches!(err, CuratrError::Memory(_)));
    assert!(history.list()?.is_empty());

    let memory = FakeMemory::new();
    let retry = runner(test_config(), &history, &source, &model, &memory);
    match retry.run(date("2026-02-17")).await? {
        CycleOutcome::Completed { record, .. } => assert_eq!(record.cycle_id.as_str(), "2026-02-15"),
        other => panic!("expected Completed, got {:?}", other),
    }
    assert_eq!(memory.stored(), 3);
    Ok(())
}

/// A model that stays unreachable aborts the cycle instead of recording an empty digest.
#[tokio::test]
async fn test_systemic_scoring_failure_aborts() -> Result<()> {
    let history = Arc::new(SqliteRunHistory::open_in_memory()?);
    let source = relevant_source();
    let model = FakeModel::new(|_| Err(ScoreError::Unavailable("connection refused".to_string())));
    let memory = FakeMemory::new();

    let mut config = test_config();
    config.scoring.unavailable_threshold = 2;
    let runner = runner(config, &history, &source, &model, &memory);

    let err = runner.run(date("2026-02-17")).await.unwrap_err();
    match err {
        CuratrError::ScoringUnavailable { consecutive, last_error } => {
            assert_eq!(consecutive, 2);
            assert!(last_error.contains("connection refused"));
        }
        other => panic!("expected ScoringUnavailable, got {:?}", other),
    }

    // Two candidates, one retry each
    assert_eq!(model.calls(), 4);
    assert_eq!(memory.stored(), 0);
    assert!(history.list()?.is_empty());

    // The claim was released
    let id = CycleId::from_anchor(date("2026-02-15"));
    assert!(matches!(history.try_claim(&id, Utc::now(), Duration::from_secs(60))?, Claim::Acquired(_)));
    Ok(())
}

/// A live claim blocks a concurrent run before any external call; a stale one is taken over.
#[tokio::test]
async fn test_claims_guard_concurrent_runs() -> Result<()> {
    let history = Arc::new(SqliteRunHistory::open_in_memory()?);
    let id = CycleId::from_anchor(date("2026-02-15"));
    let source = relevant_source();
    let runner = runner(test_config(), &history, &source, &FakeModel::constant(5), &FakeMemory::new());

    let Claim::Acquired(token) = history.try_claim(&id, Utc::now(), Duration::from_secs(3600))? else {
        panic!("expected a fresh claim");
    };
    assert!(matches!(runner.run(date("2026-02-17")).await?, CycleOutcome::HeldElsewhere(_)));
    assert_eq!(source.calls(), 0);

    // Re-claim as if a crashed run took it seven hours ago
    history.release(&id, token)?;
    let crashed_at = Utc::now() - chrono::Duration::hours(7);
    history.try_claim(&id, crashed_at, Duration::from_secs(3600))?;

    assert!(matches!(runner.run(date("2026-02-17")).await?, CycleOutcome::Completed { .. }));
    assert_eq!(source.calls(), 1);
    Ok(())
}

/// Inserting an existing cycle fails on the key, not on a prior lookup.
#[test]
fn test_duplicate_insert_rejected() -> Result<()> {
    let history = SqliteRunHistory::open_in_memory()?;
    seed(&history, "2026-02-15", "2026-02-02", "2026-02-17")?;

    let err = seed(&history, "2026-02-15", "2026-02-02", "2026-02-18").unwrap_err();
    assert!(matches!(err, CuratrError::DuplicateCycle(ref id) if id == "2026-02-15"));
    Ok(())
}
