//! Layer 1: keyword relevance.

use regex::Regex;

use crate::domain::{Candidate, RankedCandidate};
use crate::error::{CuratrError, Result};

/// Counts distinct keywords that appear as whole words in title or abstract.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    patterns: Vec<(String, Regex)>,
}

impl KeywordScorer {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let mut patterns: Vec<(String, Regex)> = Vec::new();

        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if keyword.is_empty() || patterns.iter().any(|(k, _)| *k == keyword) {
                continue;
            }
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&keyword)))
                .map_err(|e| CuratrError::Config(format!("Bad keyword '{}': {}", keyword, e)))?;
            patterns.push((keyword, pattern));
        }

        if patterns.is_empty() {
            return Err(CuratrError::Config("no usable keywords".to_string()));
        }

        Ok(Self { patterns })
    }

    /// Distinct keyword hits; each keyword counts at most once.
    pub fn score(&self, candidate: &Candidate) -> u32 {
        let haystack = format!("{} {}", candidate.title, candidate.abstract_text);
        self.patterns.iter().filter(|(_, re)| re.is_match(&haystack)).count() as u32
    }

    /// Score every candidate, keeping fetch order and dropping zero scores.
    pub fn apply(&self, candidates: Vec<Candidate>) -> Vec<RankedCandidate> {
        candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let score = self.score(&candidate);
                (score > 0).then(|| RankedCandidate::new(candidate, index, score))
            })
            .collect()
    }
}
