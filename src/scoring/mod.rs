//! Layer 3: external-model scoring.
//!
//! This module provides:
//! - `ScoringModel`: the request/response capability (text in, bounded score
//!   plus rationale out)
//! - `GeminiClient`: the Generative Language API implementation
//! - `parse_verdict`: tolerant parsing of the constrained JSON reply
//! - `ModelScorer`: the strictly sequential driver with one retry per
//!   candidate, fixed backoff, fixed inter-request pause and a consecutive
//!   transport-failure threshold

pub mod gemini;
pub mod model;
pub mod pacing;
pub mod prompt;
pub mod scorer;
pub mod verdict;

pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{ModelVerdict, ScoreError, ScoringModel};
pub use pacing::RequestPacer;
pub use prompt::PromptBuilder;
pub use scorer::{MAX_ATTEMPTS, ModelScorer, ScoringOutcome, ScoringReport};
pub use verdict::{ScoreRange, parse_verdict};
