//! The constrained scoring prompt.

use crate::config::ScoringConfig;
use crate::domain::Candidate;

use super::verdict::ScoreRange;

/// Renders the scoring instruction plus a compact candidate context.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instruction: String,
    abstract_chars: usize,
    author_preview: usize,
}

impl PromptBuilder {
    pub fn new(template: &str, range: ScoreRange, abstract_chars: usize, author_preview: usize) -> Self {
        let instruction = template
            .replace("{min}", &range.min.to_string())
            .replace("{max}", &range.max.to_string());
        Self {
            instruction,
            abstract_chars,
            author_preview,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(
            &config.prompt,
            ScoreRange::new(config.min_score, config.max_score),
            config.abstract_chars,
            config.author_preview,
        )
    }

    pub fn build(&self, candidate: &Candidate) -> String {
        format!("{}\n\n{}", self.instruction, self.context(candidate))
    }

    fn context(&self, candidate: &Candidate) -> String {
        let mut authors = candidate
            .authors
            .iter()
            .take(self.author_preview)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if candidate.authors.len() > self.author_preview {
            authors.push_str(&format!(" et al. ({} total)", candidate.authors.len()));
        }

        let abstract_text: String = candidate.abstract_text.chars().take(self.abstract_chars).collect();

        format!(
            "Title: {}\nAuthors: {}\nAbstract: {}",
            candidate.title, authors, abstract_text
        )
    }
}
