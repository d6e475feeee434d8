//! Error types for Curatr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can abort a curation cycle
#[derive(Debug, Error)]
pub enum CuratrError {
    /// A CycleRecord with this id already exists
    #[error("Cycle already recorded: {0}")]
    DuplicateCycle(String),

    /// Run history persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Candidate source could not be queried
    #[error("Source error: {0}")]
    Source(String),

    /// The scoring model stayed unreachable across consecutive candidates
    #[error("Scoring unavailable after {consecutive} consecutive transport failures: {last_error}")]
    ScoringUnavailable { consecutive: u32, last_error: String },

    /// Memory-store write failed
    #[error("Memory store error: {0}")]
    Memory(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for CuratrError {
    fn from(err: rusqlite::Error) -> Self {
        CuratrError::Storage(err.to_string())
    }
}

/// Result type alias for Curatr operations
pub type Result<T> = std::result::Result<T, CuratrError>;
