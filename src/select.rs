//! Final selection of the cycle's top candidates.

use std::cmp::Ordering;

use crate::domain::ScoredCandidate;

/// Keep the `k` best candidates.
///
/// Order is final score descending, then combined score descending, then
/// fetch order, so equal inputs always select the same candidates.
pub fn select_top(mut scored: Vec<ScoredCandidate>, k: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(rank);
    scored.truncate(k);
    scored
}

fn rank(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.final_score()
        .cmp(&a.final_score())
        .then_with(|| b.combined_score().cmp(&a.combined_score()))
        .then_with(|| a.ranked.fetch_index.cmp(&b.ranked.fetch_index))
}
