//! Cycle identity, fetch window and the persisted completion record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical cycle identifier: the anchor date as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(String);

impl CycleId {
    /// Derive the id of the cycle anchored at `anchor`.
    pub fn from_anchor(anchor: NaiveDate) -> Self {
        Self(anchor.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The window a pending cycle will fetch: `since_date..=until_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWindow {
    pub cycle_id: CycleId,
    pub anchor_date: NaiveDate,
    pub since_date: NaiveDate,
    pub until_date: NaiveDate,
}

impl CycleWindow {
    pub fn new(anchor_date: NaiveDate, since_date: NaiveDate, until_date: NaiveDate) -> Self {
        Self {
            cycle_id: CycleId::from_anchor(anchor_date),
            anchor_date,
            since_date,
            until_date,
        }
    }

    /// Number of calendar days covered, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.until_date - self.since_date).num_days() + 1
    }
}

/// A completed cycle. Only ever written once everything downstream has persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle_id: CycleId,
    pub anchor_date: NaiveDate,
    pub since_date: NaiveDate,
    pub until_date: NaiveDate,
    /// Candidates returned by the source, before any filtering
    pub candidates_fetched: u32,
    /// Candidates kept after selection
    pub candidates_selected: u32,
    pub completed_at: DateTime<Utc>,
}

impl CycleRecord {
    pub fn completed(window: &CycleWindow, fetched: usize, selected: usize, completed_at: DateTime<Utc>) -> Self {
        Self {
            cycle_id: window.cycle_id.clone(),
            anchor_date: window.anchor_date,
            since_date: window.since_date,
            until_date: window.until_date,
            candidates_fetched: u32::try_from(fetched).unwrap_or(u32::MAX),
            candidates_selected: u32::try_from(selected).unwrap_or(u32::MAX),
            completed_at,
        }
    }
}
