//! Memory entry payloads.

use serde_json::json;

use crate::domain::{CycleId, ScoredCandidate, SCORE_SCALE};
use crate::error::Result;

/// Titles listed in a digest summary.
const SUMMARY_TITLES: usize = 5;

/// Characters kept per summary title.
const SUMMARY_TITLE_CHARS: usize = 80;

pub fn paper_message(scored: &ScoredCandidate, abstract_chars: usize, author_preview: usize) -> Result<String> {
    let candidate = scored.candidate();
    let payload = json!({
        "type": "research_paper",
        "id": candidate.id,
        "title": candidate.title,
        "authors": candidate.author_preview(author_preview),
        "abstract": truncate(&candidate.abstract_text, abstract_chars),
        "submitted": candidate.submitted.format("%Y-%m-%d").to_string(),
        "url": candidate.url,
        "impact_score": impact(scored.final_score()),
        "llm_score": scored.model_score,
        "llm_reason": scored.model_rationale,
    });
    Ok(format!("Remember this research paper: {}", serde_json::to_string(&payload)?))
}

pub fn digest_summary_message(cycle_id: &CycleId, selected: &[ScoredCandidate]) -> Result<String> {
    let top: Vec<String> = selected
        .iter()
        .take(SUMMARY_TITLES)
        .map(|s| truncate(&s.candidate().title, SUMMARY_TITLE_CHARS))
        .collect();
    let payload = json!({
        "type": "digest_summary",
        "cycle_id": cycle_id.as_str(),
        "paper_count": selected.len(),
        "top_papers": top,
    });
    Ok(format!("Remember this research digest: {}", serde_json::to_string(&payload)?))
}

/// Final score in keyword units, as stored for readers of the memory.
fn impact(final_score: i64) -> f64 {
    final_score as f64 / f64::from(SCORE_SCALE)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
