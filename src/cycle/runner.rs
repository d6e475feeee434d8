//! Cycle runner - one scheduled invocation from window decision to record.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use log::{info, warn};

use super::summary::RunSummary;
use crate::config::Config;
use crate::domain::{CycleId, CycleRecord, CycleWindow, ScoredCandidate};
use crate::error::Result;
use crate::filter::{KeywordScorer, ReputationBooster, admit_top};
use crate::memory::{MemoryStore, write_selection};
use crate::scheduler::{WindowCalculator, WindowDecision};
use crate::scoring::{ModelScorer, PromptBuilder, RequestPacer, ScoringModel};
use crate::select::select_top;
use crate::source::CandidateSource;
use crate::store::{Claim, RunHistory};

/// Whether a run persists its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Live,
    /// Fetch, filter, score and select; skip memory writes and the record.
    DryRun,
}

/// Result of one invocation.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The current cycle is already recorded; nothing was done.
    AlreadyCompleted(CycleId),
    /// The window is empty; nothing was fetched or recorded.
    Empty {
        cycle_id: CycleId,
        since_date: NaiveDate,
        until_date: NaiveDate,
    },
    /// Another invocation is running this cycle.
    HeldElsewhere(CycleId),
    /// The cycle ran and its record was written.
    Completed {
        record: CycleRecord,
        selected: Vec<ScoredCandidate>,
        summary: RunSummary,
    },
    /// The cycle ran without persisting anything.
    DryRun {
        window: CycleWindow,
        selected: Vec<ScoredCandidate>,
        summary: RunSummary,
    },
}

/// Runs curation cycles against injected collaborators.
pub struct CycleRunner {
    config: Config,
    calculator: WindowCalculator,
    keywords: KeywordScorer,
    reputation: ReputationBooster,
    history: Arc<dyn RunHistory>,
    source: Arc<dyn CandidateSource>,
    model: Arc<dyn ScoringModel>,
    memory: Arc<dyn MemoryStore>,
    mode: RunMode,
}

impl CycleRunner {
    pub fn new(
        config: Config,
        history: Arc<dyn RunHistory>,
        source: Arc<dyn CandidateSource>,
        model: Arc<dyn ScoringModel>,
        memory: Arc<dyn MemoryStore>,
    ) -> Result<Self> {
        let calculator = WindowCalculator::from_config(&config.schedule)?;
        let keywords = KeywordScorer::new(&config.filter.keywords)?;
        let reputation =
            ReputationBooster::with_fraction(&config.filter.reputation_names, config.filter.reputation_bonus);

        Ok(Self {
            config,
            calculator,
            keywords,
            reputation,
            history,
            source,
            model,
            memory,
            mode: RunMode::Live,
        })
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// What a run on `today` would do. No side effects.
    pub fn preview(&self, today: NaiveDate) -> Result<WindowDecision> {
        let completed = self.history.completed_anchors()?;
        Ok(self.calculator.decide(today, &completed))
    }

    /// Run the cycle that is due on `today`, if any.
    ///
    /// The cycle is claimed before any external call and the claim is released
    /// whether the run succeeds or fails. The record is written last, after
    /// every memory write succeeded.
    pub async fn run(&self, today: NaiveDate) -> Result<CycleOutcome> {
        let window = match self.preview(today)? {
            WindowDecision::Run(window) => window,
            WindowDecision::AlreadyCompleted(cycle_id) => {
                info!("Cycle {} already completed, nothing to do", cycle_id);
                return Ok(CycleOutcome::AlreadyCompleted(cycle_id));
            }
            WindowDecision::Empty {
                cycle_id,
                since_date,
                until_date,
            } => {
                info!("Cycle {} has an empty window ({} > {})", cycle_id, since_date, until_date);
                return Ok(CycleOutcome::Empty {
                    cycle_id,
                    since_date,
                    until_date,
                });
            }
        };

        let ttl = Duration::from_secs(self.config.schedule.claim_ttl_secs);
        let token = match self.history.try_claim(&window.cycle_id, Utc::now(), ttl)? {
            Claim::Acquired(token) => token,
            Claim::HeldElsewhere => {
                warn!("Cycle {} is claimed by another run", window.cycle_id);
                return Ok(CycleOutcome::HeldElsewhere(window.cycle_id));
            }
            Claim::AlreadyCompleted => {
                info!("Cycle {} completed while we were starting", window.cycle_id);
                return Ok(CycleOutcome::AlreadyCompleted(window.cycle_id));
            }
        };

        info!(
            "Running cycle {} over {} to {} ({} days)",
            window.cycle_id,
            window.since_date,
            window.until_date,
            window.days()
        );

        let result = self.execute(window.clone()).await;

        // A claim left behind expires after the ttl, so the run's own result stands
        if let Err(e) = self.history.release(&window.cycle_id, token) {
            warn!("Failed to release claim on {}: {}", window.cycle_id, e);
        }

        result
    }

    async fn execute(&self, window: CycleWindow) -> Result<CycleOutcome> {
        let mut summary = RunSummary::default();

        let candidates = self.source.fetch(window.since_date, window.until_date).await?;
        summary.fetched = candidates.len();

        let mut ranked = self.keywords.apply(candidates);
        summary.keyword_matched = ranked.len();

        summary.boosted = self.reputation.apply(&mut ranked);

        let admitted = admit_top(ranked, self.config.filter.admission_limit);
        summary.admitted = admitted.len();
        info!(
            "Layer 1/2: {} of {} matched, {} boosted, {} admitted",
            summary.keyword_matched, summary.fetched, summary.boosted, summary.admitted
        );

        let mut scorer = ModelScorer::new(
            self.model.clone(),
            PromptBuilder::from_config(&self.config.scoring),
            RequestPacer::from_config(&self.config.scoring),
        );
        let outcome = scorer.score_all(admitted).await?;
        summary.scoring = outcome.report;

        let selected = select_top(outcome.scored, self.config.selection.target);
        summary.selected = selected.len();

        if self.mode == RunMode::DryRun {
            info!("Dry run for {}: {}", window.cycle_id, summary);
            return Ok(CycleOutcome::DryRun {
                window,
                selected,
                summary,
            });
        }

        summary.memory_entries =
            write_selection(self.memory.as_ref(), &window.cycle_id, &selected, &self.config.memory).await?;

        let record = CycleRecord::completed(&window, summary.fetched, summary.selected, Utc::now());
        self.history.insert(&record)?;
        info!("Cycle {} recorded: {}", record.cycle_id, summary);

        Ok(CycleOutcome::Completed {
            record,
            selected,
            summary,
        })
    }
}
