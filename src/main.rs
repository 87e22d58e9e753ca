//! ComplaintPro CLI entry point.
//!
//! Classifies complaint predictions from files, keeps the rolling window of
//! the latest ones and prints or exports its counts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use complaintpro::application::aggregate::SharedWindow;
use complaintpro::application::export::{ExportOptions, ReportExporter};
use complaintpro::domain::MatchStrategy;
use complaintpro::infra::app_config::{AppConfig, load_config, save_config};
use complaintpro::infra::db::Database;
use complaintpro::infra::source::{StaticSource, demo_complaints, open_source};
use complaintpro::{IngestSession, KeywordCategorizer, RollingWindow};

#[derive(Parser, Debug)]
#[command(name = "complaintpro")]
#[command(version)]
#[command(about = "Live customer complaint analytics", long_about = None)]
struct Args {
    /// Config file (defaults to COMPLAINTPRO_CONFIG_PATH or the data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize raw sentiment labels (e.g. LABEL_0, NEG, positiv)
    Normalize {
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Categorize a complaint text by keywords
    Categorize {
        text: String,
        /// Override the configured matching strategy (first_match, most_hits)
        #[arg(long)]
        strategy: Option<MatchStrategy>,
    },

    /// Classify complaints from CSV or JSON-lines files into the rolling window
    Ingest {
        /// Input files; the built-in demo set is used when none are given
        inputs: Vec<PathBuf>,
        /// Window capacity (overrides the config)
        #[arg(long)]
        capacity: Option<usize>,
        /// Pause between complaints of one input, in milliseconds
        #[arg(long, default_value = "0")]
        interval_ms: u64,
        /// Write a Markdown report of the final window
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write the final window as CSV
        #[arg(long)]
        export_csv: Option<PathBuf>,
        /// Also archive every record in this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
        /// Number of newest complaints listed in the report
        #[arg(long, default_value = "10")]
        latest: usize,
    },

    /// Show counts over the whole archive
    History {
        /// Archive database (defaults to COMPLAINTPRO_DB_PATH or the data directory)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Number of recent complaints to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Delete every archived complaint
    Purge {
        /// Archive database (defaults to COMPLAINTPRO_DB_PATH or the data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write it to this path instead of stdout
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Normalize { labels } => normalize(&config, &labels),
        Commands::Categorize { text, strategy } => categorize(&config, &text, strategy),
        Commands::Ingest {
            inputs,
            capacity,
            interval_ms,
            report,
            export_csv,
            db,
            latest,
        } => {
            let outputs = Outputs {
                report,
                export_csv,
                latest,
            };
            ingest(
                config,
                inputs,
                capacity,
                Duration::from_millis(interval_ms),
                db,
                outputs,
            )
            .await
        }
        Commands::History { db, limit } => history(db.as_deref(), limit),
        Commands::Purge { db } => {
            let removed = open_archive(db.as_deref())?.complaint_repo().delete_all()?;
            println!("Removed {removed} archived complaints");
            Ok(())
        }
        Commands::Config { write } => match write {
            Some(path) => {
                save_config(&config, &path)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
            None => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        },
    }
}

fn normalize(config: &AppConfig, labels: &[String]) -> Result<()> {
    let classifier = config.classifier()?;
    for label in labels {
        println!("{label}\t{}", classifier.normalizer().normalize(label));
    }
    Ok(())
}

fn categorize(config: &AppConfig, text: &str, strategy: Option<MatchStrategy>) -> Result<()> {
    let mut taxonomy = config.taxonomy()?;
    if let Some(strategy) = strategy {
        taxonomy = taxonomy.with_strategy(strategy);
    }
    println!("{}", KeywordCategorizer::new(taxonomy).categorize(text));
    Ok(())
}

struct Outputs {
    report: Option<PathBuf>,
    export_csv: Option<PathBuf>,
    latest: usize,
}

async fn ingest(
    mut config: AppConfig,
    inputs: Vec<PathBuf>,
    capacity: Option<usize>,
    interval: Duration,
    db: Option<PathBuf>,
    outputs: Outputs,
) -> Result<()> {
    if let Some(capacity) = capacity {
        config.capacity = capacity;
    }
    let window = SharedWindow::new(config.window()?);
    let mut session = IngestSession::new(config.classifier()?, window.clone());
    if let Some(path) = db {
        session = session.with_archive(Database::open_at(&path)?.complaint_repo());
    }

    let mut handles = Vec::new();
    if inputs.is_empty() {
        log::info!("No inputs given, using the demo complaints");
        let source = Box::new(StaticSource::new("demo", demo_complaints()));
        let session = session.clone();
        handles.push(tokio::spawn(async move { session.drain(source, interval).await }));
    }
    for path in &inputs {
        let source = open_source(path)?;
        let session = session.clone();
        handles.push(tokio::spawn(async move { session.drain(source, interval).await }));
    }

    let mut ingested = 0;
    for handle in handles {
        let stats = handle.await.context("ingest task panicked")?;
        ingested += stats.ingested;
    }

    window.read(|w| print_window(w, ingested));

    if let Some(path) = &outputs.report {
        let options = ExportOptions {
            latest: outputs.latest,
            ..ExportOptions::default()
        };
        let markdown = window.read(|w| ReportExporter::to_markdown(w, &options));
        std::fs::write(path, markdown)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    if let Some(path) = &outputs.export_csv {
        write_csv(path, &window)?;
        log::info!("CSV written to {}", path.display());
    }

    Ok(())
}

fn write_csv(path: &Path, window: &SharedWindow) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    ReportExporter::write_csv(&window.snapshot(), BufWriter::new(file))
}

fn print_window(window: &RollingWindow, ingested: usize) {
    let summary = window.summary();
    println!(
        "{} complaints analyzed, window holds {}/{}",
        ingested,
        window.len(),
        window.capacity()
    );
    println!(
        "Negative: {}  High priority: {}  Most common: {}",
        summary.negative,
        summary.high_priority,
        summary.most_common.as_deref().unwrap_or("-")
    );

    println!("\nCategories");
    for (label, count) in window.counts_by_category() {
        println!("  {label:<12} {count:>4}");
    }

    println!("\nSentiment");
    for (sentiment, count) in window.counts_by_sentiment() {
        println!("  {:<12} {count:>4}", sentiment.to_string());
    }

    let terms = window.top_negative_terms(5);
    if !terms.is_empty() {
        let terms: Vec<_> = terms.iter().map(|(t, c)| format!("{t} ({c})")).collect();
        println!("\nTop negative terms: {}", terms.join(", "));
    }
}

fn open_archive(db: Option<&Path>) -> Result<Database> {
    match db {
        Some(path) => Database::open_at(path),
        None => Database::open(),
    }
}

fn history(db: Option<&Path>, limit: usize) -> Result<()> {
    let repo = open_archive(db)?.complaint_repo();

    println!("{} complaints archived", repo.count()?);
    println!("\nCategories");
    for (label, count) in repo.counts_by_category()? {
        println!("  {label:<12} {count:>6}");
    }
    println!("\nSentiment");
    for (sentiment, count) in repo.counts_by_sentiment()? {
        println!("  {:<12} {count:>6}", sentiment.to_string());
    }

    let recent = repo.list_recent(limit)?;
    if !recent.is_empty() {
        println!("\nLatest {}", recent.len());
        for record in recent {
            println!(
                "  {} | {} | {} | {}",
                record.timestamp().format("%Y-%m-%d %H:%M"),
                record.category(),
                record.sentiment().code(),
                record.text()
            );
        }
    }
    Ok(())
}
