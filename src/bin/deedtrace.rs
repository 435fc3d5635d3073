//! Deedtrace CLI — property ownership research runner.
//!
//! Usage:
//!   deedtrace run <ADDRESS> [--db path] [--json]
//!   deedtrace history [--db path] [--limit n]
//!
//! The CLI drives the standard pipeline over the bundled fixture sources;
//! real site integrations are wired through the library API.

use clap::{Parser, Subcommand};
use deedtrace::{
    EngineConfig, FixtureSources, ResearchApi, ResearchConfig, SqliteSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "deedtrace",
    version,
    about = "Property ownership research engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research one property address
    Run {
        /// Property address to research
        address: String,
        /// Path to the SQLite results database
        #[arg(long)]
        db: Option<PathBuf>,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
        /// Per-step timeout in seconds
        #[arg(long, default_value_t = 30)]
        step_timeout: u64,
        /// Whole-run timeout in seconds
        #[arg(long, default_value_t = 300)]
        run_timeout: u64,
    },
    /// List recently stored runs
    History {
        /// Path to the SQLite results database
        #[arg(long)]
        db: Option<PathBuf>,
        /// Maximum rows to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print a stored run as JSON
    Show {
        /// Run id from `history`
        run_id: String,
        /// Path to the SQLite results database
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn default_db_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("deedtrace").join("runs.db")
}

fn open_sink(db: Option<PathBuf>) -> Result<SqliteSink, Box<dyn std::error::Error>> {
    let path = db.unwrap_or_else(default_db_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteSink::open(&path)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            address,
            db,
            json,
            step_timeout,
            run_timeout,
        } => {
            let sink = Arc::new(open_sink(db)?);
            let config = ResearchConfig {
                engine: EngineConfig::new()
                    .with_step_timeout(Duration::from_secs(step_timeout))
                    .with_run_timeout(Duration::from_secs(run_timeout)),
                ..ResearchConfig::default()
            };
            let api = ResearchApi::standard(&FixtureSources::clients(), config, sink)?;
            let record = api.run_research(&address).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
                return Ok(());
            }

            println!("Address:        {}", record.address);
            println!("Stage:          {}", record.stage);
            println!(
                "Owner:          {}",
                record.primary_owner.as_deref().unwrap_or("unknown")
            );
            if let Some(owner_type) = record.owner_type {
                println!("Owner type:     {}", owner_type);
            }
            println!(
                "Contact number: {}",
                record.contact_number.as_deref().unwrap_or("not available")
            );
            if !record.owner_candidates.is_empty() {
                println!("\nOwner candidates:");
                for candidate in &record.owner_candidates {
                    println!(
                        "  {} [{}] via {} ({})",
                        candidate.name, candidate.owner_type, candidate.source,
                        candidate.confidence
                    );
                }
            }
            if !record.phone_candidates.is_empty() {
                println!("\nPhone candidates:");
                for phone in &record.phone_candidates {
                    let validity = match phone.valid {
                        Some(true) => "valid",
                        Some(false) => "invalid",
                        None => "unverified",
                    };
                    let contact = deedtrace::reconcile::attributed_contact(phone)
                        .unwrap_or_else(|| "Unknown".into());
                    println!(
                        "  {} ({}) via {} ({}, {})",
                        phone.formatted,
                        contact,
                        phone
                            .sources
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>()
                            .join("+"),
                        phone.confidence,
                        validity
                    );
                }
            }
            if !record.emails.is_empty() {
                println!("\nEmails: {}", record.emails.join(", "));
            }
            if !record.errors.is_empty() {
                println!("\nDiagnostics:");
                for error in &record.errors {
                    println!("  - {}", error);
                }
            }
        }
        Commands::History { db, limit } => {
            let sink = open_sink(db)?;
            let summaries = sink.recent(limit)?;
            if summaries.is_empty() {
                println!("No stored runs.");
                return Ok(());
            }
            for summary in summaries {
                println!(
                    "{}  {}  {}  [{}]  owner: {}  contact: {}",
                    summary.run_id,
                    summary.completed_at.as_deref().unwrap_or("-"),
                    summary.address,
                    summary.stage,
                    summary.owner.as_deref().unwrap_or("unknown"),
                    summary.contact_number.as_deref().unwrap_or("none"),
                );
            }
        }
        Commands::Show { run_id, db } => {
            let sink = open_sink(db)?;
            match sink.load(&run_id)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("No stored run with id {}", run_id),
            }
        }
    }

    Ok(())
}
