//! In-process fakes for driving a CycleRunner end to end.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use curatr::config::Config;
use curatr::cycle::CycleRunner;
use curatr::domain::Candidate;
use curatr::error::{CuratrError, Result};
use curatr::memory::MemoryStore;
use curatr::scoring::{ModelVerdict, ScoreError, ScoringModel};
use curatr::source::CandidateSource;
use curatr::store::SqliteRunHistory;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn candidate(id: &str, title: &str, authors: &[&str]) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: title.to_string(),
        abstract_text: "Field measurements and survey results.".to_string(),
        authors: authors.iter().map(|a| a.to_string()).collect(),
        submitted: date("2026-02-05"),
        url: format!("https://arxiv.org/abs/{}", id),
    }
}

/// Config with zero waits so tests never sleep.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.scoring.retry_backoff_ms = 0;
    config.scoring.inter_request_ms = 0;
    config
}

/// Returns a fixed candidate list and records every requested window.
pub struct FakeSource {
    candidates: Vec<Candidate>,
    pub windows: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

impl FakeSource {
    pub fn new(candidates: Vec<Candidate>) -> Arc<Self> {
        Arc::new(Self {
            candidates,
            windows: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

#[async_trait]
impl CandidateSource for FakeSource {
    async fn fetch(&self, since: NaiveDate, until: NaiveDate) -> Result<Vec<Candidate>> {
        self.windows.lock().unwrap().push((since, until));
        Ok(self.candidates.clone())
    }
}

type Reply = std::result::Result<ModelVerdict, ScoreError>;

/// Answers each prompt with a caller-supplied function and records prompts.
pub struct FakeModel {
    reply: Box<dyn Fn(&str) -> Reply + Send + Sync>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn new(reply: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn constant(score: i64) -> Arc<Self> {
        Self::new(move |_| Ok(ModelVerdict::new(score, "steady")))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Title of the candidate behind each prompt, in call order.
    pub fn titles(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.lines().find_map(|l| l.strip_prefix("Title: ")).map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl ScoringModel for FakeModel {
    async fn score(&self, text: &str) -> Reply {
        self.prompts.lock().unwrap().push(text.to_string());
        (self.reply)(text)
    }

    fn model(&self) -> &str {
        "fake"
    }
}

/// Collects messages; fails the write with index `fail_at`, if set.
#[derive(Default)]
pub struct FakeMemory {
    pub messages: Mutex<Vec<String>>,
    fail_at: Option<usize>,
    attempts: AtomicUsize,
}

impl FakeMemory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some(index),
            ..Self::default()
        })
    }

    pub fn stored(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MemoryStore for FakeMemory {
    async fn remember(&self, message: &str) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if Some(attempt) == self.fail_at {
            return Err(CuratrError::Memory("memory store offline".to_string()));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub fn runner(
    config: Config,
    history: &Arc<SqliteRunHistory>,
    source: &Arc<FakeSource>,
    model: &Arc<FakeModel>,
    memory: &Arc<FakeMemory>,
) -> CycleRunner {
    CycleRunner::new(config, history.clone(), source.clone(), model.clone(), memory.clone()).unwrap()
}
