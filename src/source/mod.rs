//! Candidate sources.
//!
//! A source returns every candidate submitted inside an inclusive date
//! window, in the order the upstream service lists them. That order becomes
//! each candidate's `fetch_index`, the last tie-breaker in every ranking.

mod arxiv;

pub use arxiv::{ArxivSource, build_query, parse_feed};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::Candidate;
use crate::error::Result;

/// Fetches raw candidates for a date window.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidates submitted between `since` and `until`, both inclusive.
    async fn fetch(&self, since: NaiveDate, until: NaiveDate) -> Result<Vec<Candidate>>;
}
