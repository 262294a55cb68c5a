//! Regwatch CLI - regulatory change detection pipeline
//!
//! Feeds fetched-document batches through the change detector and queries
//! the resulting change log. Fetching itself is out of scope; batches arrive
//! as JSON files produced by an external scraping step.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use regwatch_core::classify::{
    Classifier, HttpScoringModel, LearnedClassifier, RuleClassifier, action_items,
};
use regwatch_core::config::Config;
use regwatch_core::detect::ChangeDetector;
use regwatch_core::domain::{FetchedDocument, RiskLevel};
use regwatch_core::storage::{Database, DatabaseConfig, SqliteChangeLog, SqliteSnapshotStore};

#[derive(Parser)]
#[command(name = "regwatch")]
#[command(author, version, about = "Regulatory change detection pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Database file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Clone, Copy, Default, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run change detection over a batch of fetched documents
    Scan {
        /// JSON file holding an array of {source, title, url, content} records
        batch_file: PathBuf,
    },

    /// List recent changes, newest first
    Recent {
        /// Look-back window in days
        #[arg(short, long, default_value_t = 7)]
        days: i64,
    },

    /// Classify a piece of text without touching the store
    Classify {
        /// Text to classify
        text: String,
    },

    /// Show recommended actions for a risk level and impact areas
    Actions {
        /// Risk level (low, medium, high)
        risk: String,
        /// Impact areas, repeatable
        #[arg(short, long)]
        area: Vec<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match &cli.command {
        Commands::Scan { batch_file } => scan(&cli, &config, batch_file).await,
        Commands::Recent { days } => recent(&cli, &config, *days).await,
        Commands::Classify { text } => classify(&cli, &config, text).await,
        Commands::Actions { risk, area } => actions(&cli, risk, area),
        Commands::Config { action } => config_cmd(action),
        Commands::Doctor => doctor(&cli).await,
    }
}

fn config_cmd(action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(key, value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            println!("Configuration reset to defaults.");
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

/// Pick the learned classifier when a model API key is configured, the
/// rule-based one otherwise.
fn build_classifier(config: &Config) -> anyhow::Result<Arc<dyn Classifier>> {
    match config.model.resolved_api_key()? {
        Some(api_key) => match HttpScoringModel::new(config.model.clone(), api_key) {
            Ok(model) => {
                info!(model = %config.model.sentiment_model, "Using learned classifier");
                Ok(Arc::new(LearnedClassifier::new(
                    config.classifier.clone(),
                    config.model.clone(),
                    Arc::new(model),
                )))
            }
            Err(err) => {
                warn!(error = %err, "Could not build scoring model, using rule-based classifier");
                Ok(Arc::new(RuleClassifier::new(config.classifier.clone())))
            }
        },
        None => Ok(Arc::new(RuleClassifier::new(config.classifier.clone()))),
    }
}

fn database_config(cli: &Cli) -> DatabaseConfig {
    match &cli.db {
        Some(path) => DatabaseConfig::with_path(path),
        None => DatabaseConfig::default(),
    }
}

async fn open_detector(cli: &Cli, config: &Config) -> anyhow::Result<(ChangeDetector, Database)> {
    let db = Database::new(database_config(cli)).await?;
    let detector = ChangeDetector::new(
        Arc::new(SqliteSnapshotStore::new(db.pool().clone())),
        Arc::new(SqliteChangeLog::new(db.pool().clone())),
        build_classifier(config)?,
    );
    Ok((detector, db))
}

async fn scan(cli: &Cli, config: &Config, batch_file: &PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(batch_file)
        .with_context(|| format!("Failed to read batch file: {}", batch_file.display()))?;
    let batch: Vec<FetchedDocument> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse batch file: {}", batch_file.display()))?;

    let (detector, db) = open_detector(cli, config).await?;
    let outcome = detector.detect(&batch).await;
    db.close().await;

    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome.changes)?);
    } else {
        println!(
            "Scanned {} documents: {} changes, {} failures",
            batch.len(),
            outcome.changes.len(),
            outcome.failures.len()
        );
        for (i, change) in outcome.changes.iter().enumerate() {
            println!(
                "\n{}. {} [{} | {} | {}]",
                i + 1,
                change.title,
                change.source,
                change.change_type.as_str(),
                change.risk_level.as_str()
            );
            println!("   Impact: {}", change.impact_areas.join(", "));
            println!("   Summary: {}", change.summary);
        }
    }

    for failure in &outcome.failures {
        eprintln!("error [{}] {}: {}", failure.error.code(), failure.url, failure.error);
    }
    Ok(())
}

async fn recent(cli: &Cli, config: &Config, days: i64) -> anyhow::Result<()> {
    let (detector, db) = open_detector(cli, config).await?;
    let records = detector.recent_changes(days).await?;
    db.close().await;

    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!("{} changes in the last {} days", records.len(), days);
        for record in &records {
            println!(
                "{}  {}  [{} | {}]  {}",
                record.detected_at.format("%Y-%m-%d %H:%M"),
                record.title,
                record.change_type.as_str(),
                record.risk_level.as_str(),
                record.impact_areas.join(", ")
            );
        }
    }
    Ok(())
}

async fn classify(cli: &Cli, config: &Config, text: &str) -> anyhow::Result<()> {
    let classifier = build_classifier(config)?;
    let result = classifier.classify(text).await;
    let summary = classifier.summarize(text).await;

    if cli.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "risk_level": result.risk_level.as_str(),
                "confidence": result.confidence,
                "impact_areas": result.impact_areas,
                "reasoning": result.reasoning,
                "summary": summary,
            })
        );
    } else {
        println!("Risk: {} (confidence {:.2})", result.risk_level.as_str(), result.confidence);
        println!("Impact: {}", result.impact_areas.join(", "));
        println!("Reasoning: {}", result.reasoning);
        println!("Summary: {}", summary);
    }
    Ok(())
}

fn actions(cli: &Cli, risk: &str, areas: &[String]) -> anyhow::Result<()> {
    let risk_level: RiskLevel = risk.parse()?;
    let items = action_items(risk_level, areas);

    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for (i, item) in items.iter().enumerate() {
            println!("{}. {}", i + 1, item);
        }
    }
    Ok(())
}

async fn doctor(cli: &Cli) -> anyhow::Result<()> {
    let db = Database::new(database_config(cli)).await?;
    db.health_check().await?;
    let status = db.migration_status().await?;
    println!(
        "Database OK at {} (schema v{})",
        db.path().display(),
        status.current_version
    );
    db.close().await;
    Ok(())
}
