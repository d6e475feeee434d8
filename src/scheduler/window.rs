//! Pure cycle-window calculation.

use chrono::{Days, NaiveDate};

use super::anchor::AnchorDays;
use crate::config::ScheduleConfig;
use crate::domain::{CycleId, CycleWindow};
use crate::error::Result;

/// What the scheduler should do for a given "today".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowDecision {
    /// Run this cycle over this window.
    Run(CycleWindow),
    /// The current anchor's cycle is already recorded. Expected steady state
    /// when invoked more than once per period.
    AlreadyCompleted(CycleId),
    /// The computed window is empty (since > until). Nothing to fetch and nothing to record.
    Empty {
        cycle_id: CycleId,
        since_date: NaiveDate,
        until_date: NaiveDate,
    },
}

/// Maps "today" and the run history to the cycle that should run now.
#[derive(Debug, Clone)]
pub struct WindowCalculator {
    anchors: AnchorDays,
    /// Length of the first-ever window; None means "since the previous anchor".
    bootstrap_days: Option<u32>,
}

impl WindowCalculator {
    pub fn new(anchors: AnchorDays, bootstrap_days: Option<u32>) -> Self {
        Self {
            anchors,
            bootstrap_days,
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let anchors = AnchorDays::new(config.anchor_days.iter().copied())?;
        Ok(Self::new(anchors, config.bootstrap_days))
    }

    /// Decide what to run on `today`, given the anchor dates of every completed cycle.
    pub fn decide(&self, today: NaiveDate, completed_anchors: &[NaiveDate]) -> WindowDecision {
        let target = self.anchors.current_anchor(today);
        let cycle_id = CycleId::from_anchor(target);

        if completed_anchors.contains(&target) {
            return WindowDecision::AlreadyCompleted(cycle_id);
        }

        let since_date = match completed_anchors.iter().max() {
            Some(last) => *last + Days::new(1),
            None => self.bootstrap_since(target, today),
        };
        let until_date = today;

        if since_date > until_date {
            return WindowDecision::Empty {
                cycle_id,
                since_date,
                until_date,
            };
        }

        WindowDecision::Run(CycleWindow::new(target, since_date, until_date))
    }

    fn bootstrap_since(&self, target: NaiveDate, today: NaiveDate) -> NaiveDate {
        match self.bootstrap_days {
            Some(days) => today
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            None => self.anchors.previous_anchor(target) + Days::new(1),
        }
    }
}

impl Default for WindowCalculator {
    fn default() -> Self {
        Self::new(AnchorDays::default(), None)
    }
}
