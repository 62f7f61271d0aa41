//! Inventory CLI
//!
//! Imports IaC state documents into the canonical resource model and
//! fingerprints or verifies resource change records.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use inv_core::{
    build_ledger, ChangeRecord, InMemoryResourceStore, ImportReport, OperationContext,
    StateImporter,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "inventory")]
#[command(version)]
#[command(about = "Multi-cloud resource inventory: state import and change provenance", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import a state document
    Import {
        /// Path to the state file
        state_file: PathBuf,

        /// Abort the import after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Record a fingerprinted change for every stored resource
        #[arg(long)]
        track_changes: bool,

        /// Print every imported resource
        #[arg(long)]
        show_resources: bool,
    },

    /// Fingerprint a change record read from a JSON file
    Fingerprint {
        /// Path to the change record
        change_file: PathBuf,
    },

    /// Verify a fingerprinted change record read from a JSON file
    Verify {
        /// Path to the change record
        change_file: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            if cli.config.is_some() {
                return Err(e);
            }
            if cli.verbose {
                eprintln!("Using default configuration (no config file found)");
            }
            AppConfig::default()
        }
    };

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.logging.level()
    };
    inv_observability::init_logging_with_config(inv_observability::LoggingConfig {
        level: log_level,
        json_format: config.logging.json,
        ..Default::default()
    });
    inv_observability::register_metrics();

    match cli.command {
        Commands::Import {
            state_file,
            timeout_secs,
            track_changes,
            show_resources,
        } => {
            cmd_import(
                &config,
                &state_file,
                timeout_secs.or(config.import.timeout_secs),
                track_changes || config.import.track_changes,
                show_resources,
                cli.format,
            )
            .await
        }
        Commands::Fingerprint { change_file } => {
            cmd_fingerprint(&config, &change_file, cli.format).await
        }
        Commands::Verify { change_file } => cmd_verify(&config, &change_file, cli.format),
        Commands::Config => cmd_config(&config, &config_path, cli.format),
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("io", "inventory", "inventory") {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("config/inventory.yaml")
    }
}

async fn cmd_import(
    config: &AppConfig,
    state_file: &Path,
    timeout_secs: Option<u64>,
    track_changes: bool,
    show_resources: bool,
    format: OutputFormat,
) -> Result<()> {
    let raw = std::fs::read(state_file)
        .with_context(|| format!("Failed to read state file: {}", state_file.display()))?;

    let (handle, mut ctx) = OperationContext::cancellable();
    if let Some(secs) = timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping import after the current item");
            handle.cancel();
        }
    });

    let store = InMemoryResourceStore::new();
    let mut importer =
        StateImporter::new(Arc::new(store.clone())).with_actor(config.import.actor.clone());
    if track_changes {
        let ledger = build_ledger(&config.ledger);
        if !ledger.is_enabled() {
            warn!("Change tracking requested but the ledger is disabled");
        }
        importer = importer.with_ledger(ledger);
    }

    let span = inv_observability::import_span!(state_file.display(), bytes = raw.len());
    let report = importer
        .import_state(&ctx, &raw)
        .instrument(span)
        .await
        .with_context(|| format!("Failed to import {}", state_file.display()))?;

    info!(stored = store.count().await, "Store updated");
    print_import_report(&report, show_resources, format)
}

fn print_import_report(
    report: &ImportReport,
    show_resources: bool,
    format: OutputFormat,
) -> Result<()> {
    let summary = report.summary();

    if format == OutputFormat::Json {
        let mut output = serde_json::json!({ "summary": summary });
        if show_resources {
            output["resources"] = serde_json::to_value(&report.resources)?;
        }
        if !report.change_records.is_empty() {
            output["change_records"] = serde_json::to_value(&report.change_records)?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Import Summary".bold());
    println!("─────────────────────");
    println!("Import ID:  {}", summary.import_id);
    if let Some(serial) = summary.serial {
        println!("Serial:     {}", serial);
    }
    println!("Instances:  {}", summary.total_instances);
    println!("Imported:   {}", summary.imported.to_string().green());
    if summary.skipped > 0 {
        println!("Skipped:    {}", summary.skipped.to_string().yellow());
    }
    println!("Persisted:  {}", summary.persisted);
    if summary.persistence_failed > 0 {
        println!("Failed:     {}", summary.persistence_failed.to_string().red());
    }
    if summary.changes_tracked > 0 || summary.ledger_failures > 0 {
        println!(
            "Changes:    {} tracked, {} rejected",
            summary.changes_tracked, summary.ledger_failures
        );
    }
    println!("Duration:   {} ms", summary.duration_ms);

    if let Some(reason) = summary.interrupted {
        println!();
        println!("{} {}", "Import stopped early:".yellow().bold(), reason);
    }

    if !summary.errors.is_empty() {
        println!();
        println!("{}", "Problems:".yellow().bold());
        for error in &summary.errors {
            println!("  {} {}", "⚠".yellow(), error);
        }
    }

    if show_resources && !report.resources.is_empty() {
        println!();
        println!("{}", "Resources:".bold());
        for resource in &report.resources {
            println!(
                "  {:<10} {:<28} {:<40} {}",
                resource.provider.to_string().cyan(),
                resource.resource_type,
                resource.id,
                resource.region.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

fn read_change_record(path: &Path) -> Result<ChangeRecord> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read change record: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse change record: {}", path.display()))
}

async fn cmd_fingerprint(
    config: &AppConfig,
    change_file: &Path,
    format: OutputFormat,
) -> Result<()> {
    let mut record = read_change_record(change_file)?;
    let ledger = build_ledger(&config.ledger);
    let span = inv_observability::ledger_span!("track", record.resource_id);

    if !ledger.is_enabled() && format == OutputFormat::Text {
        println!(
            "{}",
            "Ledger is disabled; the record is returned unchanged.".yellow()
        );
    }

    ledger
        .track_change(&OperationContext::background(), &mut record)
        .instrument(span)
        .await
        .context("Failed to fingerprint change record")?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_verify(config: &AppConfig, change_file: &Path, format: OutputFormat) -> Result<()> {
    let record = read_change_record(change_file)?;
    let ledger = build_ledger(&config.ledger);
    let _span = inv_observability::ledger_span!("verify", record.resource_id).entered();

    let valid = ledger.verify_change_record(&record);

    if format == OutputFormat::Json {
        let output = serde_json::json!({
            "resource_id": record.resource_id,
            "block_hash": record.block_hash,
            "ledger_enabled": ledger.is_enabled(),
            "valid": valid,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if valid {
        println!(
            "{} {}",
            "✓".green(),
            format!("Change record for {} is intact", record.resource_id).green()
        );
    } else {
        println!(
            "{} {}",
            "✗".red(),
            format!(
                "Change record for {} does not match its fingerprint",
                record.resource_id
            )
            .red()
            .bold()
        );
    }

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_config(config: &AppConfig, config_path: &Path, format: OutputFormat) -> Result<()> {
    let warnings = config.warnings();

    if format == OutputFormat::Json {
        let output = serde_json::json!({
            "path": config_path.display().to_string(),
            "ledger_mode": config.ledger.mode(),
            "config": config,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", "Config file:".bold(), config_path.display());
    println!("{} {}", "Ledger mode:".bold(), config.ledger.mode());
    println!();
    print!("{}", serde_yaml::to_string(config)?);

    if !warnings.is_empty() {
        println!();
        println!("{}", "Configuration Warnings:".yellow().bold());
        for warning in &warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    Ok(())
}
