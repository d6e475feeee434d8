//! Request pacing and failure accounting for the scoring loop.
//!
//! The scoring model is a shared, rate-limited service. Requests are spaced by
//! a fixed pause, a failed attempt waits a fixed backoff before its single
//! retry, and a run of candidates that could not reach the model at all is
//! treated as a systemic outage.

use std::time::Duration;

use crate::config::ScoringConfig;

/// Pacing state for one scoring pass.
#[derive(Debug)]
pub struct RequestPacer {
    /// Wait before retrying a failed attempt.
    pub retry_backoff: Duration,
    /// Wait between consecutive candidates.
    pub inter_request: Duration,
    /// Consecutive unavailable candidates that abort the pass.
    pub threshold: u32,
    /// Candidates in a row whose final attempt was unavailable.
    pub consecutive_unavailable: u32,
}

impl RequestPacer {
    pub fn new(retry_backoff: Duration, inter_request: Duration, threshold: u32) -> Self {
        Self {
            retry_backoff,
            inter_request,
            threshold: threshold.max(1),
            consecutive_unavailable: 0,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.retry_backoff(), config.inter_request(), config.unavailable_threshold)
    }

    /// Record a scored candidate.
    pub fn record_success(&mut self) {
        self.consecutive_unavailable = 0;
    }

    /// Record a candidate dropped for a malformed reply. The model answered,
    /// so the outage streak ends.
    pub fn record_dropped(&mut self) {
        self.consecutive_unavailable = 0;
    }

    /// Record a candidate whose final attempt could not reach the model.
    ///
    /// Returns true once the streak reaches the threshold.
    pub fn record_unavailable(&mut self, reason: &str) -> bool {
        self.consecutive_unavailable += 1;

        tracing::warn!(
            consecutive_unavailable = self.consecutive_unavailable,
            threshold = self.threshold,
            reason,
            "Scoring model unavailable"
        );

        self.consecutive_unavailable >= self.threshold
    }

    /// Wait before a retry.
    pub async fn backoff(&self) {
        if !self.retry_backoff.is_zero() {
            tokio::time::sleep(self.retry_backoff).await;
        }
    }

    /// Wait between candidates.
    pub async fn pause(&self) {
        if !self.inter_request.is_zero() {
            tokio::time::sleep(self.inter_request).await;
        }
    }
}
