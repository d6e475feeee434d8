//! Domain types for Curatr
//!
//! - CycleRecord / CycleWindow: one scheduled curation cycle and its fetch window
//! - Candidate: a fetched document, enriched layer by layer into RankedCandidate
//!   and finally ScoredCandidate

pub mod candidate;
pub mod cycle;

pub use candidate::{Candidate, RankedCandidate, SCORE_SCALE, ScoredCandidate};
pub use cycle::{CycleId, CycleRecord, CycleWindow};
