//! Configuration for Curatr.
//!
//! Loaded from an explicit path, ~/.config/curatr/curatr.yml or ./curatr.yml,
//! falling back to defaults.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub scoring: ScoringConfig,
    pub selection: SelectionConfig,
    pub memory: MemoryConfig,
}

/// Longest first-ever look-back accepted from config (about ten years).
pub const MAX_BOOTSTRAP_DAYS: u32 = 3650;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Day-of-month anchors for the cycle cadence.
    pub anchor_days: Vec<u32>,
    /// Fetch window length for the very first cycle; None starts the day after the previous anchor.
    pub bootstrap_days: Option<u32>,
    /// Age after which an unreleased claim is considered abandoned.
    pub claim_ttl_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            anchor_days: vec![1, 15],
            bootstrap_days: None,
            claim_ttl_secs: 6 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("curatr")
                .join("pipeline.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub category: String,
    pub max_results: usize,
    pub page_size: usize,
    pub page_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://export.arxiv.org/api/query".to_string(),
            category: "cs.AI".to_string(),
            max_results: 2000,
            page_size: 100,
            page_delay_ms: 3000,
            timeout_ms: 60000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub keywords: Vec<String>,
    pub reputation_names: Vec<String>,
    /// Bonus for a reputation match, as a fraction of one keyword hit.
    pub reputation_bonus: f64,
    /// How many candidates are admitted to model scoring.
    pub admission_limit: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keywords: [
                "multi-agent",
                "diffusion",
                "alignment",
                "llm",
                "rlhf",
                "reasoning",
                "rag",
                "transformer",
                "memory",
                "retrieval",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            reputation_names: default_reputation_names(),
            reputation_bonus: 0.5,
            admission_limit: 150,
        }
    }
}

fn default_reputation_names() -> Vec<String> {
    [
        "Yann LeCun",
        "Yoshua Bengio",
        "Geoffrey Hinton",
        "Ilya Sutskever",
        "Andrej Karpathy",
        "John Schulman",
        "Paul Christiano",
        "Alec Radford",
        "Demis Hassabis",
        "David Silver",
        "Oriol Vinyals",
        "Jeff Dean",
        "Quoc Le",
        "Noam Shazeer",
        "Samy Bengio",
        "Pieter Abbeel",
        "Sergey Levine",
        "Chelsea Finn",
        "Percy Liang",
        "Christopher Manning",
        "Fei-Fei Li",
        "Jure Leskovec",
        "Ruslan Salakhutdinov",
        "Tom Mitchell",
        "Ashish Vaswani",
        "Jakob Uszkoreit",
        "Llion Jones",
        "Yang Song",
        "Prafulla Dhariwal",
        "Alex Nichol",
        "Jonathan Ho",
        "Jan Leike",
        "Ziegler",
        "Harrison Chase",
        "Langchain",
        "Omar Khattab",
        "Yann Dauphin",
        "Luke Zettlemoyer",
        "Mike Lewis",
        "Tim Dettmers",
        "Guillaume Lample",
        "Alexandre Sablayrolles",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub min_score: i64,
    pub max_score: i64,
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
    pub retry_backoff_ms: u64,
    pub inter_request_ms: u64,
    /// Consecutive candidates lost to transport failure before the cycle aborts.
    pub unavailable_threshold: u32,
    pub prompt: String,
    pub abstract_chars: usize,
    pub author_preview: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemma-3-27b-it".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            min_score: 1,
            max_score: 10,
            max_output_tokens: 200,
            timeout_ms: 60000,
            retry_backoff_ms: 10000,
            inter_request_ms: 2000,
            unavailable_threshold: 5,
            prompt: "Rate this paper from {min}-{max} for potential research impact based on novelty, \
                     scope, methodological rigor, and broader implications. \
                     Return JSON only, no other text: {\"score\": <int {min}-{max}>, \"reason\": \"<one sentence>\"}"
                .to_string(),
            abstract_chars: 1200,
            author_preview: 5,
        }
    }
}

impl ScoringConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn inter_request(&self) -> Duration {
        Duration::from_millis(self.inter_request_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub target: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { target: 25 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
    pub abstract_chars: usize,
    pub author_preview: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            command: "zeroclaw".to_string(),
            args: vec!["agent".to_string(), "--message".to_string()],
            timeout_secs: 120,
            abstract_chars: 800,
            author_preview: 4,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            schedule: ScheduleConfig::default(),
            storage: StorageConfig::default(),
            source: SourceConfig::default(),
            filter: FilterConfig::default(),
            scoring: ScoringConfig::default(),
            selection: SelectionConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.anchor_days.is_empty() {
            eyre::bail!("schedule.anchor_days must not be empty");
        }
        if let Some(day) = self.schedule.anchor_days.iter().find(|d| !(1..=28).contains(*d)) {
            eyre::bail!("schedule.anchor_days entry {} must be within 1..=28", day);
        }
        if self.schedule.bootstrap_days.is_some_and(|days| days > MAX_BOOTSTRAP_DAYS) {
            eyre::bail!("schedule.bootstrap_days must not exceed {}", MAX_BOOTSTRAP_DAYS);
        }
        if self.filter.keywords.iter().all(|k| k.trim().is_empty()) {
            eyre::bail!("filter.keywords must contain at least one keyword");
        }
        if !(self.filter.reputation_bonus > 0.0 && self.filter.reputation_bonus < 1.0) {
            eyre::bail!("filter.reputation_bonus must be between 0 and 1 (exclusive)");
        }
        if self.filter.admission_limit == 0 {
            eyre::bail!("filter.admission_limit must be > 0");
        }
        if self.scoring.min_score > self.scoring.max_score {
            eyre::bail!("scoring.min_score must not exceed scoring.max_score");
        }
        if self.scoring.unavailable_threshold == 0 {
            eyre::bail!("scoring.unavailable_threshold must be > 0");
        }
        if self.selection.target == 0 {
            eyre::bail!("selection.target must be > 0");
        }
        Ok(())
    }
}
