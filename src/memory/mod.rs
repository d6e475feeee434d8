//! Memory-store writes for selected candidates.
//!
//! Each selected candidate becomes one `research_paper` entry, followed by a
//! single `digest_summary` entry for the cycle. Every write must succeed
//! before the cycle may be recorded as complete.

mod cli;
mod message;

pub use cli::CliMemoryStore;
pub use message::{digest_summary_message, paper_message};

use async_trait::async_trait;
use log::info;

use crate::config::MemoryConfig;
use crate::domain::{CycleId, ScoredCandidate};
use crate::error::Result;

/// Write-only capability of the external knowledge store.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store one message. Any error means the entry was not stored.
    async fn remember(&self, message: &str) -> Result<()>;
}

/// Write every selected candidate and then the digest summary.
///
/// Stops at the first failed write. Returns the number of entries stored.
pub async fn write_selection(
    store: &dyn MemoryStore,
    cycle_id: &CycleId,
    selected: &[ScoredCandidate],
    config: &MemoryConfig,
) -> Result<usize> {
    if selected.is_empty() {
        info!("No candidates selected for {}, nothing to store", cycle_id);
        return Ok(0);
    }

    for (i, scored) in selected.iter().enumerate() {
        let message = paper_message(scored, config.abstract_chars, config.author_preview)?;
        store.remember(&message).await?;
        info!("Stored {}/{} ({})", i + 1, selected.len(), scored.candidate().id);
    }

    store.remember(&digest_summary_message(cycle_id, selected)?).await?;
    info!("Stored digest summary for {}", cycle_id);

    Ok(selected.len() + 1)
}
