//! Cycle scheduling.
//!
//! Cycles are anchored on fixed days of the month (1st and 15th by default).
//! The window calculator maps "today" plus the anchors of completed cycles to
//! the cycle that should run now and the date range it must fetch. It never
//! reads the clock or the database itself; callers pass both in.
//!
//! # Run-if-missed
//!
//! The fetch window starts the day after the last *completed* anchor and ends
//! on the invocation date, so a run that happens days or weeks late covers
//! every day since the last success.

mod anchor;
mod window;

pub use anchor::AnchorDays;
pub use window::{WindowCalculator, WindowDecision};
