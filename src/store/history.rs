//! SQLite-backed run history with an atomic claim table.

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::{CycleId, CycleRecord};
use crate::error::{CuratrError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifies one holder of a claim; only that holder can release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimToken(i64);

/// Outcome of trying to take a cycle before running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// This invocation owns the cycle until it releases the claim.
    Acquired(ClaimToken),
    /// Another invocation holds a live claim.
    HeldElsewhere,
    /// The cycle was recorded as completed.
    AlreadyCompleted,
}

/// Durable table of completed cycles.
pub trait RunHistory: Send + Sync {
    /// Whether a CycleRecord exists for `cycle_id`.
    fn exists(&self, cycle_id: &CycleId) -> Result<bool>;

    /// Insert a completed cycle. Fails with `DuplicateCycle` if the id is present.
    fn insert(&self, record: &CycleRecord) -> Result<()>;

    /// Anchor dates of every completed cycle.
    fn completed_anchors(&self) -> Result<Vec<NaiveDate>>;

    /// All completed cycles, oldest anchor first.
    fn list(&self) -> Result<Vec<CycleRecord>>;

    /// Atomically take `cycle_id` unless it is completed or claimed by someone
    /// else within `ttl` of `now`.
    fn try_claim(&self, cycle_id: &CycleId, now: DateTime<Utc>, ttl: Duration) -> Result<Claim>;

    /// Drop a claim taken with `try_claim`. A claim that has since been taken
    /// over by another run is left alone.
    fn release(&self, cycle_id: &CycleId, token: ClaimToken) -> Result<()>;
}

/// Run history in a single SQLite file.
///
/// rusqlite's Connection isn't Sync, so it sits behind a Mutex; every
/// operation is short and needs exclusive access anyway.
pub struct SqliteRunHistory {
    db: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteRunHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRunHistory").finish_non_exhaustive()
    }
}

impl SqliteRunHistory {
    /// Open or create the history database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let db = Connection::open(path)
            .map_err(|e| CuratrError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
        Self::from_connection(db)
    }

    /// In-memory history, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        Self::init_schema(&db)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn init_schema(db: &Connection) -> Result<()> {
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                cycle_id            TEXT PRIMARY KEY,
                anchor_date         TEXT NOT NULL,
                since_date          TEXT NOT NULL,
                until_date          TEXT NOT NULL,
                candidates_fetched  INTEGER NOT NULL,
                candidates_selected INTEGER NOT NULL,
                completed_at        TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_runs_anchor ON runs(anchor_date);

            CREATE TABLE IF NOT EXISTS claims (
                cycle_id   TEXT PRIMARY KEY,
                claimed_at INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| CuratrError::Storage(format!("Failed to initialize schema: {}", e)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|e| CuratrError::Storage(e.to_string()))
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
        Ok(RawRecord {
            cycle_id: row.get(0)?,
            anchor_date: row.get(1)?,
            since_date: row.get(2)?,
            until_date: row.get(3)?,
            candidates_fetched: row.get(4)?,
            candidates_selected: row.get(5)?,
            completed_at: row.get(6)?,
        })
    }
}

/// Column values as stored, before date parsing.
struct RawRecord {
    cycle_id: String,
    anchor_date: String,
    since_date: String,
    until_date: String,
    candidates_fetched: u32,
    candidates_selected: u32,
    completed_at: String,
}

impl RawRecord {
    fn into_record(self) -> Result<CycleRecord> {
        let completed_at = DateTime::parse_from_rfc3339(&self.completed_at)
            .map_err(|e| CuratrError::Storage(format!("Bad completed_at for {}: {}", self.cycle_id, e)))?
            .with_timezone(&Utc);

        Ok(CycleRecord {
            anchor_date: parse_date(&self.anchor_date)?,
            since_date: parse_date(&self.since_date)?,
            until_date: parse_date(&self.until_date)?,
            cycle_id: CycleId::from_anchor(parse_date(&self.cycle_id)?),
            candidates_fetched: self.candidates_fetched,
            candidates_selected: self.candidates_selected,
            completed_at,
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| CuratrError::Storage(format!("Bad date '{}': {}", value, e)))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl RunHistory for SqliteRunHistory {
    fn exists(&self, cycle_id: &CycleId) -> Result<bool> {
        let db = self.lock()?;
        let found = db
            .query_row("SELECT 1 FROM runs WHERE cycle_id = ?1", [cycle_id.as_str()], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, record: &CycleRecord) -> Result<()> {
        let db = self.lock()?;
        let result = db.execute(
            r#"
            INSERT INTO runs
                (cycle_id, anchor_date, since_date, until_date,
                 candidates_fetched, candidates_selected, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.cycle_id.as_str(),
                format_date(record.anchor_date),
                format_date(record.since_date),
                format_date(record.until_date),
                record.candidates_fetched,
                record.candidates_selected,
                record.completed_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(CuratrError::DuplicateCycle(record.cycle_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn completed_anchors(&self) -> Result<Vec<NaiveDate>> {
        let db = self.lock()?;
        let mut stmt = db.prepare("SELECT anchor_date FROM runs ORDER BY anchor_date")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut anchors = Vec::new();
        for row in rows {
            anchors.push(parse_date(&row?)?);
        }
        Ok(anchors)
    }

    fn list(&self) -> Result<Vec<CycleRecord>> {
        let db = self.lock()?;
        let mut stmt = db.prepare(
            r#"
            SELECT cycle_id, anchor_date, since_date, until_date,
                   candidates_fetched, candidates_selected, completed_at
            FROM runs ORDER BY anchor_date
            "#,
        )?;
        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn try_claim(&self, cycle_id: &CycleId, now: DateTime<Utc>, ttl: Duration) -> Result<Claim> {
        let mut db = self.lock()?;
        let tx = db.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let completed = tx
            .query_row("SELECT 1 FROM runs WHERE cycle_id = ?1", [cycle_id.as_str()], |_| Ok(()))
            .optional()?
            .is_some();
        if completed {
            return Ok(Claim::AlreadyCompleted);
        }

        let now_ms = now.timestamp_millis();
        let stale_before = now_ms.saturating_sub(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));

        // Inserts a fresh claim, or takes over one older than the ttl
        let changed = tx.execute(
            r#"
            INSERT INTO claims (cycle_id, claimed_at) VALUES (?1, ?2)
            ON CONFLICT(cycle_id) DO UPDATE SET claimed_at = excluded.claimed_at
            WHERE claims.claimed_at < ?3
            "#,
            params![cycle_id.as_str(), now_ms, stale_before],
        )?;
        tx.commit()?;

        if changed == 1 {
            Ok(Claim::Acquired(ClaimToken(now_ms)))
        } else {
            Ok(Claim::HeldElsewhere)
        }
    }

    fn release(&self, cycle_id: &CycleId, token: ClaimToken) -> Result<()> {
        let db = self.lock()?;
        let removed = db.execute(
            "DELETE FROM claims WHERE cycle_id = ?1 AND claimed_at = ?2",
            params![cycle_id.as_str(), token.0],
        )?;
        if removed == 0 {
            warn!("Claim on {} was taken over before release", cycle_id);
        }
        Ok(())
    }
}
