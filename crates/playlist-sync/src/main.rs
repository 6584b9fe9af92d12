use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use playlist_graph::validation::collect_findings;
use playlist_graph::{plan_document, GraphDocument, Timestamp};
use playlist_sync::SyncConfig;
use tracing::info;

#[derive(Parser)]
#[command(name = "playlist-sync")]
#[command(about = "Inspect and plan playlist feed graph documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a graph document and print every finding
    Validate {
        /// Graph document (JSON)
        document: PathBuf,
    },

    /// Print the synchronization plan for a graph document as JSON
    Plan {
        /// Graph document (JSON)
        document: PathBuf,

        /// Only emit ADD operations
        #[arg(long)]
        no_removals: bool,
    },

    /// Set every edge date in a graph document and print the result
    Touch {
        /// Graph document (JSON)
        document: PathBuf,

        /// New fence date (RFC 3339)
        #[arg(long, value_parser = parse_date)]
        date: Timestamp,
    },
}

fn parse_date(value: &str) -> Result<Timestamp, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 date: {e}"))
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SyncConfig::from_yaml_file(path),
        None => SyncConfig::load(),
    }
    .context("Failed to load configuration")?;

    playlist_monitoring::init(&config.monitoring_config()).context("Failed to initialize monitoring")?;

    match cli.command {
        Commands::Validate { document } => {
            let json = read_document(&document)?;
            let graph_document = GraphDocument::from_json(&json).context("Failed to decode graph document")?;

            let findings = collect_findings(&graph_document);
            if findings.is_empty() {
                println!(
                    "OK: {} playlists, {} edges",
                    graph_document.len(),
                    graph_document.edge_count()
                );
            } else {
                for finding in &findings {
                    println!("{finding}");
                }
                bail!("{} finding(s) in {}", findings.len(), document.display());
            }
        }
        Commands::Plan { document, no_removals } => {
            let mut options = config.plan_options();
            if no_removals {
                options.emit_removals = false;
            }

            let json = read_document(&document)?;
            let operations = plan_document(&json, &options)
                .with_context(|| format!("No plan for {}", document.display()))?;

            info!(operations = operations.len(), "Plan computed");
            println!("{}", serde_json::to_string_pretty(&operations)?);
        }
        Commands::Touch { document, date } => {
            let json = read_document(&document)?;
            let touched = GraphDocument::from_json(&json)
                .context("Failed to decode graph document")?
                .touch_edge_dates(date);

            println!("{}", touched.to_json_pretty()?);
        }
    }

    playlist_monitoring::shutdown();
    Ok(())
}
