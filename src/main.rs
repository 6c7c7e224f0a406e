mod error;

use crate::error::{ErrorKind, Result};
use bestpub_config::Config;
use bestpub_db::{Database, SqliteStore};
use bestpub_library::ingest::{IngestionStats, Outcome, run_cycle};
use bestpub_library::publish::{publish, publish_if_changed};
use bestpub_library::{Context, ProcessContext, title_status};
use bestpub_model::Isbn;
use clap::{Parser, Subcommand};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Drop-folder ingestion and EPUB publishing for BestPub titles.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON) used instead of the defaults.
    #[arg(short, long, global = true, env = "BESTPUB_CONFIG")]
    config: Option<PathBuf>,
    /// More logging; repeat for more still. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one scan cycle over the drop directory.
    Ingest {
        /// Print the workflow variables as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Build and deliver a title's artifact.
    Publish {
        isbn: String,
        /// Skip titles with no changes since they were last published.
        #[arg(long)]
        if_changed: bool,
    },
    /// Show what the content store holds for a title.
    Status { isbn: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "{}", *err);
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init().is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = bestpub_config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Loaded configuration");
    let ctx = context(&config).await?;
    match cli.command {
        Command::Ingest { json } => ingest(&ctx, json).await,
        Command::Publish { isbn, if_changed } => {
            let isbn = parse_isbn(&isbn)?;
            let delivery = match if_changed {
                true => publish_if_changed(&ctx, &isbn).await,
                false => publish(&ctx, &isbn).await.map(Some),
            }
            .or_raise(|| ErrorKind::Publish)?;
            match delivery {
                Some(delivery) => println!("{} {} -> {}", delivery.isbn, delivery.version, delivery.path.display()),
                None => println!("{isbn} unchanged"),
            }
            Ok(())
        },
        Command::Status { isbn } => status(&ctx, &parse_isbn(&isbn)?).await,
    }
}

async fn context(config: &Config) -> Result<Context> {
    if let Some(parent) = config.database.path.parent() {
        std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Database)?;
    }
    let db = Database::connect(&config.database.path).await.or_raise(|| ErrorKind::Database)?;
    Ok(Context::new(Arc::new(SqliteStore::new("bestpub", &db)), config))
}

fn parse_isbn(isbn: &str) -> Result<Isbn> {
    isbn.parse::<Isbn>().or_raise(|| ErrorKind::InvalidIsbn(isbn.to_string()))
}

async fn ingest(ctx: &Context, json: bool) -> Result<()> {
    let mut stats = IngestionStats::default();
    let report = run_cycle(ctx, &mut stats).await.or_raise(|| ErrorKind::Ingest)?;
    if json {
        let mut variables = ProcessContext::default();
        report.outcomes.iter().for_each(|outcome| variables.record(outcome));
        let out = serde_json::to_string_pretty(&variables).or_raise(|| ErrorKind::Output)?;
        println!("{out}");
        return Ok(());
    }
    for outcome in &report.outcomes {
        match outcome {
            Outcome::Imported { isbn, transition, summary, .. } => {
                println!("imported    {isbn} ({transition}, {} chapters)", summary.chapters.len());
            },
            Outcome::Rejected { archive, quarantined } => {
                println!("rejected    {} -> {}", archive.display(), quarantined.display());
            },
            Outcome::Failed { isbn, quarantined, .. } => {
                println!("quarantined {isbn} -> {}", quarantined.display());
            },
        }
    }
    println!(
        "{} discovered, {} imported, {} quarantined, {} errors",
        report.discovered,
        stats.imported,
        stats.quarantined,
        report.errors.len()
    );
    Ok(())
}

async fn status(ctx: &Context, isbn: &Isbn) -> Result<()> {
    let Some(status) = title_status(ctx, isbn).await.or_raise(|| ErrorKind::Status)? else {
        exn::bail!(ErrorKind::UnknownTitle(isbn.to_string()));
    };
    let title = &status.title;
    let display = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    println!("ISBN:      {}", title.isbn);
    println!("Title:     {}", display(title.metadata.title.clone()));
    println!("Authors:   {}", title.metadata.authors.join(", "));
    println!("Status:    {}", display(title.status.map(|s| s.to_string())));
    println!("Metadata:  {}", display(title.metadata_status.map(|s| s.to_string())));
    println!("Published: {}", display(status.publish.version.map(|v| v.to_string())));
    println!("Chapters:");
    for chapter in &status.chapters {
        let name = chapter.info.title.as_deref().unwrap_or("(untitled)");
        println!("  {:>3}  {:<9}  {name}", chapter.info.number, chapter.status.to_string());
    }
    Ok(())
}
