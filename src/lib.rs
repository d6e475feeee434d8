//! Curatr - biweekly research paper curation
//!
//! Each cycle fetches the papers submitted since the last completed cycle,
//! filters them through keyword relevance, an author-reputation boost and an
//! external model score, keeps the best few, writes them to a memory store and
//! records the cycle so it never runs twice.

pub mod config;
pub mod cycle;
pub mod domain;
pub mod error;
pub mod filter;
pub mod memory;
pub mod scheduler;
pub mod scoring;
pub mod select;
pub mod source;
pub mod store;

pub use error::{CuratrError, Result};
