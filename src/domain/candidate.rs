//! Candidate documents and the scores attached to them as they move through
//! the three filtering layers.
//!
//! Scores are fixed-point in tenths of a keyword hit so that a reputation
//! bonus can sit strictly below one keyword without floating point ordering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Score units per keyword hit or model point.
pub const SCORE_SCALE: u32 = 10;

/// A document as returned by the source. Identity fields never change after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable external id, e.g. "2502.12345"
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub submitted: NaiveDate,
    pub url: String,
}

impl Candidate {
    /// Authors as a display string, truncated to `limit` names.
    pub fn author_preview(&self, limit: usize) -> String {
        let mut preview = self.authors.iter().take(limit).cloned().collect::<Vec<_>>().join(", ");
        if self.authors.len() > limit {
            preview.push_str(" et al.");
        }
        preview
    }
}

/// A candidate that survived Layer 1, with its Layer 2 bonus once applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    /// Position in the fetched sequence; final tie-breaker
    pub fetch_index: usize,
    /// Distinct keyword hits, always >= 1
    pub keyword_score: u32,
    /// 0 or the configured bonus, in score units
    pub reputation_bonus: u32,
}

impl RankedCandidate {
    pub fn new(candidate: Candidate, fetch_index: usize, keyword_score: u32) -> Self {
        Self {
            candidate,
            fetch_index,
            keyword_score,
            reputation_bonus: 0,
        }
    }

    pub fn combined_score(&self) -> u32 {
        self.keyword_score * SCORE_SCALE + self.reputation_bonus
    }
}

/// A candidate the external model scored successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub ranked: RankedCandidate,
    pub model_score: i64,
    pub model_rationale: String,
}

impl ScoredCandidate {
    pub fn new(ranked: RankedCandidate, model_score: i64, model_rationale: impl Into<String>) -> Self {
        Self {
            ranked,
            model_score,
            model_rationale: model_rationale.into(),
        }
    }

    pub fn candidate(&self) -> &Candidate {
        &self.ranked.candidate
    }

    pub fn combined_score(&self) -> u32 {
        self.ranked.combined_score()
    }

    pub fn final_score(&self) -> i64 {
        i64::from(self.combined_score()) + self.model_score * i64::from(SCORE_SCALE)
    }
}
