//! Sequential Layer 3 driver.

use std::sync::Arc;

use crate::domain::{RankedCandidate, ScoredCandidate};
use crate::error::{CuratrError, Result};

use super::model::{ModelVerdict, ScoreError, ScoringModel};
use super::pacing::RequestPacer;
use super::prompt::PromptBuilder;

/// First attempt plus one retry.
pub const MAX_ATTEMPTS: u32 = 2;

/// Counters for one scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringReport {
    pub attempted: usize,
    pub scored: usize,
    pub dropped_malformed: usize,
    pub dropped_unavailable: usize,
    pub retries: usize,
    pub pauses: usize,
}

impl ScoringReport {
    pub fn dropped(&self) -> usize {
        self.dropped_malformed + self.dropped_unavailable
    }
}

/// Scored candidates in admission order, plus the pass counters.
#[derive(Debug)]
pub struct ScoringOutcome {
    pub scored: Vec<ScoredCandidate>,
    pub report: ScoringReport,
}

/// Scores admitted candidates one at a time against the external model.
pub struct ModelScorer {
    model: Arc<dyn ScoringModel>,
    prompt: PromptBuilder,
    pacer: RequestPacer,
}

impl ModelScorer {
    pub fn new(model: Arc<dyn ScoringModel>, prompt: PromptBuilder, pacer: RequestPacer) -> Self {
        Self { model, prompt, pacer }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Score every candidate in order. Never issues concurrent requests.
    ///
    /// A candidate whose final attempt fails is dropped. The pass aborts with
    /// `ScoringUnavailable` once the configured number of consecutive
    /// candidates could not reach the model.
    pub async fn score_all(&mut self, admitted: Vec<RankedCandidate>) -> Result<ScoringOutcome> {
        let total = admitted.len();
        let mut report = ScoringReport::default();
        let mut scored = Vec::with_capacity(total);

        tracing::info!(model = self.model_name(), candidates = total, "Layer 3 scoring started");

        for (position, ranked) in admitted.into_iter().enumerate() {
            report.attempted += 1;
            let prompt = self.prompt.build(&ranked.candidate);

            match self.score_one(&prompt, &ranked.candidate.id, &mut report).await {
                Ok(verdict) => {
                    tracing::debug!(
                        id = %ranked.candidate.id,
                        score = verdict.score,
                        "Candidate scored"
                    );
                    self.pacer.record_success();
                    report.scored += 1;
                    scored.push(ScoredCandidate::new(ranked, verdict.score, verdict.rationale));
                }
                Err(ScoreError::MalformedResponse(reason)) => {
                    tracing::warn!(id = %ranked.candidate.id, %reason, "Dropping candidate: malformed response");
                    self.pacer.record_dropped();
                    report.dropped_malformed += 1;
                }
                Err(ScoreError::Unavailable(reason)) => {
                    report.dropped_unavailable += 1;
                    if self.pacer.record_unavailable(&reason) {
                        tracing::error!(
                            consecutive = self.pacer.consecutive_unavailable,
                            "Scoring model unreachable, aborting cycle"
                        );
                        return Err(CuratrError::ScoringUnavailable {
                            consecutive: self.pacer.consecutive_unavailable,
                            last_error: reason,
                        });
                    }
                }
            }

            if position + 1 < total {
                self.pacer.pause().await;
                report.pauses += 1;
            }
        }

        tracing::info!(
            scored = report.scored,
            dropped = report.dropped(),
            retries = report.retries,
            "Layer 3 scoring finished"
        );

        Ok(ScoringOutcome { scored, report })
    }

    async fn score_one(
        &self,
        prompt: &str,
        id: &str,
        report: &mut ScoringReport,
    ) -> std::result::Result<ModelVerdict, ScoreError> {
        let mut attempt = 1;
        loop {
            match self.model.score(prompt).await {
                Ok(verdict) => return Ok(verdict),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    tracing::debug!(id, attempt, error = %e, "Scoring attempt failed, retrying");
                    report.retries += 1;
                    attempt += 1;
                    self.pacer.backoff().await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
