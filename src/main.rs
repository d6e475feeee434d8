use chrono::{Local, NaiveDate};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use cli::{Cli, Commands};
use curatr::config::Config;
use curatr::cycle::{CycleOutcome, CycleRunner, RunMode, RunSummary};
use curatr::domain::{SCORE_SCALE, ScoredCandidate};
use curatr::memory::CliMemoryStore;
use curatr::scheduler::{WindowCalculator, WindowDecision};
use curatr::scoring::{GeminiClient, GeminiConfig, ScoringModel};
use curatr::source::ArxivSource;
use curatr::store::{RunHistory, SqliteRunHistory};

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("curatr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("curatr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let level = if verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match cli.command.clone().unwrap_or_default() {
        Commands::Run { dry_run, today } => handle_run_command(dry_run, resolve_today(today), config).await,
        Commands::Window { today } => handle_window_command(resolve_today(today), config),
        Commands::History => handle_history_command(config),
    }
}

fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn open_history(config: &Config) -> Result<Arc<SqliteRunHistory>> {
    let history = SqliteRunHistory::open(&config.storage.db_path)
        .context(format!("Failed to open run history at {}", config.storage.db_path.display()))?;
    Ok(Arc::new(history))
}

fn build_runner(config: &Config, history: Arc<SqliteRunHistory>) -> Result<CycleRunner> {
    let source = ArxivSource::new(config.source.clone()).context("Failed to create arXiv source")?;
    let model: Arc<dyn ScoringModel> = Arc::new(
        GeminiClient::from_env(&config.scoring.api_key_env, GeminiConfig::from(&config.scoring))
            .context("Failed to create scoring client")?,
    );
    let memory = CliMemoryStore::from_config(&config.memory);

    CycleRunner::new(config.clone(), history, Arc::new(source), model, Arc::new(memory))
        .context("Failed to create cycle runner")
}

async fn handle_run_command(dry_run: bool, today: NaiveDate, config: &Config) -> Result<()> {
    info!("Running cycle for {} (dry run: {})", today, dry_run);

    let history = open_history(config)?;
    let mode = if dry_run { RunMode::DryRun } else { RunMode::Live };
    let runner = build_runner(config, history)?.with_mode(mode);

    match runner.run(today).await.context("Cycle failed")? {
        CycleOutcome::AlreadyCompleted(cycle_id) => {
            println!("{} {} already completed", "Skipped:".yellow(), cycle_id);
        }
        CycleOutcome::Empty {
            cycle_id,
            since_date,
            until_date,
        } => {
            println!(
                "{} {} has an empty window ({} after {})",
                "Skipped:".yellow(),
                cycle_id,
                since_date,
                until_date
            );
        }
        CycleOutcome::HeldElsewhere(cycle_id) => {
            println!("{} {} is being run by another invocation", "Skipped:".yellow(), cycle_id);
        }
        CycleOutcome::Completed {
            record,
            selected,
            summary,
        } => {
            println!(
                "{} {} ({} to {})",
                "Completed:".green(),
                record.cycle_id,
                record.since_date,
                record.until_date
            );
            print_summary(&summary);
            print_top(&selected, 5);
        }
        CycleOutcome::DryRun {
            window,
            selected,
            summary,
        } => {
            println!(
                "{} {} ({} to {}), nothing stored",
                "Dry run:".cyan(),
                window.cycle_id,
                window.since_date,
                window.until_date
            );
            print_summary(&summary);
            print_top(&selected, 5);
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("  {}", summary);
    if summary.memory_entries > 0 {
        println!("  {} memory entries written", summary.memory_entries);
    }
}

fn print_top(selected: &[ScoredCandidate], n: usize) {
    for (i, scored) in selected.iter().take(n).enumerate() {
        println!(
            "  {}. [{}] {} {}",
            i + 1,
            format!("{:.1}", scored.final_score() as f64 / f64::from(SCORE_SCALE)).bold(),
            scored.candidate().title,
            scored.candidate().url.dimmed()
        );
    }
}

fn handle_window_command(today: NaiveDate, config: &Config) -> Result<()> {
    info!("Previewing window for {}", today);

    let history = open_history(config)?;
    let calculator = WindowCalculator::from_config(&config.schedule).context("Invalid schedule")?;
    let completed = history.completed_anchors().context("Failed to read run history")?;

    match calculator.decide(today, &completed) {
        WindowDecision::Run(window) => {
            println!(
                "{} {} covers {} to {} ({} days)",
                "Due:".green(),
                window.cycle_id,
                window.since_date,
                window.until_date,
                window.days()
            );
        }
        WindowDecision::AlreadyCompleted(cycle_id) => {
            println!("{} {} already completed", "Done:".yellow(), cycle_id);
        }
        WindowDecision::Empty {
            cycle_id,
            since_date,
            until_date,
        } => {
            println!(
                "{} {} window is empty ({} after {})",
                "Empty:".yellow(),
                cycle_id,
                since_date,
                until_date
            );
        }
    }
    Ok(())
}

fn handle_history_command(config: &Config) -> Result<()> {
    info!("Listing run history");

    let history = open_history(config)?;
    let records = history.list().context("Failed to read run history")?;

    if records.is_empty() {
        println!("{}", "No completed cycles".yellow());
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {} to {}  fetched {:>5}  selected {:>3}  completed {}",
            record.cycle_id.to_string().green(),
            record.since_date,
            record.until_date,
            record.candidates_fetched,
            record.candidates_selected,
            record.completed_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
