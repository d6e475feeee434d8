//! Layers 1 and 2 of the candidate pipeline.
//!
//! Layer 1 scores each candidate by distinct keyword hits and drops anything
//! with no hit. Layer 2 adds a small bonus for candidates with an author on
//! the curated reputation list. The bonus is worth less than one keyword, so
//! it only reorders candidates that are already relevant. Layer 2 never sees
//! (and so can never rescue) a candidate Layer 1 dropped.
//!
//! `admit_top` then cuts the ranked list to the number of candidates the
//! external model is allowed to score.

mod keyword;
mod reputation;

pub use keyword::KeywordScorer;
pub use reputation::ReputationBooster;

use crate::domain::RankedCandidate;

/// Order by combined score (descending), then fetch order, and keep `limit`.
pub fn admit_top(mut ranked: Vec<RankedCandidate>, limit: usize) -> Vec<RankedCandidate> {
    ranked.sort_by(|a, b| {
        b.combined_score()
            .cmp(&a.combined_score())
            .then_with(|| a.fetch_index.cmp(&b.fetch_index))
    });
    ranked.truncate(limit);
    ranked
}
