//! Cycle orchestration.
//!
//! `CycleRunner` drives one invocation: decide the window, claim the cycle,
//! fetch, run the three filter layers, select, write memories and finally
//! record the cycle. Any error before the record is written leaves the cycle
//! unrecorded, so the next invocation retries the same `cycle_id`.

mod runner;
mod summary;

pub use runner::{CycleOutcome, CycleRunner, RunMode};
pub use summary::RunSummary;
