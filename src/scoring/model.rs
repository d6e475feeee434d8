//! The scoring capability consumed by Layer 3.

use async_trait::async_trait;

/// A parsed model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelVerdict {
    pub score: i64,
    pub rationale: String,
}

impl ModelVerdict {
    pub fn new(score: i64, rationale: impl Into<String>) -> Self {
        Self {
            score,
            rationale: rationale.into(),
        }
    }
}

/// Why a scoring request produced no verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    /// The model answered, but not in the required shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The model could not be reached or refused the request.
    #[error("Scoring model unavailable: {0}")]
    Unavailable(String),
}

/// Stateless scorer - each call is independent.
#[async_trait]
pub trait ScoringModel: Send + Sync {
    /// Score one prompt.
    async fn score(&self, text: &str) -> Result<ModelVerdict, ScoreError>;

    /// Model name for logs.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_error_display() {
        assert_eq!(
            ScoreError::MalformedResponse("no JSON".to_string()).to_string(),
            "Malformed response: no JSON"
        );
        assert_eq!(
            ScoreError::Unavailable("timeout".to_string()).to_string(),
            "Scoring model unavailable: timeout"
        );
    }
}
