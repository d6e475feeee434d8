//! Anchor-day arithmetic.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{CuratrError, Result};

/// Sorted, de-duplicated set of day-of-month anchors, each within 1..=28 so
/// that every anchor exists in every month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorDays(Vec<u32>);

impl AnchorDays {
    pub fn new(days: impl IntoIterator<Item = u32>) -> Result<Self> {
        let mut days: Vec<u32> = days.into_iter().collect();
        days.sort_unstable();
        days.dedup();

        if days.is_empty() {
            return Err(CuratrError::Config("at least one anchor day is required".to_string()));
        }
        if let Some(day) = days.iter().find(|d| !(1..=28).contains(*d)) {
            return Err(CuratrError::Config(format!("anchor day {} must be within 1..=28", day)));
        }

        Ok(Self(days))
    }

    /// Most recent anchor on or before `today`.
    ///
    /// Feb 17 -> Feb 15, Feb 3 -> Feb 1, Feb 1 -> Feb 1.
    pub fn current_anchor(&self, today: NaiveDate) -> NaiveDate {
        if let Some(&day) = self.0.iter().rev().find(|&&d| d <= today.day()) {
            return today - Days::new(u64::from(today.day() - day));
        }

        // Before the first anchor of the month: last anchor of the previous month
        let last_of_previous = today - Days::new(u64::from(today.day()));
        let day = self.last_day();
        last_of_previous - Days::new(u64::from(last_of_previous.day() - day))
    }

    /// Anchor immediately before `anchor`.
    ///
    /// Feb 15 -> Feb 1, Feb 1 -> Jan 15.
    pub fn previous_anchor(&self, anchor: NaiveDate) -> NaiveDate {
        self.current_anchor(anchor - Days::new(1))
    }

    fn last_day(&self) -> u32 {
        self.0.last().copied().unwrap_or(1)
    }
}

impl Default for AnchorDays {
    fn default() -> Self {
        Self(vec![1, 15])
    }
}
