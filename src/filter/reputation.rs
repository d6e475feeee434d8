//! Layer 2: reputation boost.

use crate::domain::{Candidate, RankedCandidate, SCORE_SCALE};

/// Adds a fixed bonus, once, when any curated name appears in the author list.
#[derive(Debug, Clone)]
pub struct ReputationBooster {
    names: Vec<String>,
    bonus: u32,
}

impl ReputationBooster {
    /// `bonus` is in score units and must stay below one keyword hit.
    pub fn new<S: AsRef<str>>(names: &[S], bonus: u32) -> Self {
        let names = names
            .iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self {
            names,
            bonus: bonus.clamp(1, SCORE_SCALE - 1),
        }
    }

    /// Build from a bonus expressed as a fraction of one keyword hit.
    pub fn with_fraction<S: AsRef<str>>(names: &[S], fraction: f64) -> Self {
        let units = (fraction * f64::from(SCORE_SCALE)).round().max(0.0) as u32;
        Self::new(names, units)
    }

    pub fn bonus(&self) -> u32 {
        self.bonus
    }

    /// Case-insensitive substring match of any curated name against any author.
    pub fn is_reputable(&self, candidate: &Candidate) -> bool {
        candidate.authors.iter().any(|author| {
            let author = author.to_lowercase();
            self.names.iter().any(|name| author.contains(name.as_str()))
        })
    }

    /// Set the bonus on every matching candidate. Idempotent: the bonus is
    /// assigned, never accumulated.
    pub fn apply(&self, ranked: &mut [RankedCandidate]) -> usize {
        let mut boosted = 0;
        for r in ranked.iter_mut() {
            if self.is_reputable(&r.candidate) {
                r.reputation_bonus = self.bonus;
                boosted += 1;
            } else {
                r.reputation_bonus = 0;
            }
        }
        boosted
    }
}
