//! Run history persistence.
//!
//! One row per completed cycle, keyed by `cycle_id`. The primary key is the
//! only thing that prevents a cycle from being recorded twice; callers never
//! check-then-insert.
//!
//! A separate claims table lets a runner take the cycle before it makes any
//! external call, so two overlapping invocations cannot both fetch, score and
//! write memories for the same anchor. A claim is not a completion: a cycle
//! with no row in `runs` is simply "not yet run". Each claim carries an owner
//! token, so releasing after a takeover leaves the new holder's claim intact.
//!
//! # Example
//!
//! ```ignore
//! use curatr::store::{RunHistory, SqliteRunHistory};
//!
//! let history = SqliteRunHistory::open(Path::new("/tmp/pipeline.db"))?;
//! let done = history.completed_anchors()?;
//! ```

mod history;

pub use history::{Claim, ClaimToken, RunHistory, SqliteRunHistory};
