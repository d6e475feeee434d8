//! Per-stage counts for one cycle.

use std::fmt;

use crate::scoring::ScoringReport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidates returned by the source
    pub fetched: usize,
    /// Survivors of Layer 1
    pub keyword_matched: usize,
    /// Layer 1 survivors that received the reputation bonus
    pub boosted: usize,
    /// Candidates sent to Layer 3
    pub admitted: usize,
    pub scoring: ScoringReport,
    pub selected: usize,
    /// Memory entries written (papers plus summary)
    pub memory_entries: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched {} -> keyword {} ({} boosted) -> admitted {} -> scored {} ({} dropped, {} retries) -> selected {}",
            self.fetched,
            self.keyword_matched,
            self.boosted,
            self.admitted,
            self.scoring.scored,
            self.scoring.dropped(),
            self.scoring.retries,
            self.selected
        )
    }
}
