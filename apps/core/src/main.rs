// Support Desk entry point
// Operator CLI over the triage pipeline and the email store

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use supportdesk_core::actors::supervisor::SupervisorHandle;
use supportdesk_core::config::{AppConfig, LogFormat, LoggingConfig};
use supportdesk_core::database;
use supportdesk_core::ingest::{filter_support_emails, load_from_csv};
use supportdesk_core::models::{EmailRecord, EmailStatus};
use supportdesk_core::preflight::run_preflight_checks;

#[derive(Debug, Parser)]
#[command(name = "supportdesk", version, about = "Support inbox triage with grounded reply drafts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Filter, triage and store the support emails of a CSV export
    Ingest {
        /// CSV file with sender, subject, body and sent_date columns
        #[arg(long)]
        csv: PathBuf,
        /// Knowledge-base directory (overrides SUPPORTDESK_KB_DIR)
        #[arg(long)]
        kb: Option<PathBuf>,
    },
    /// List stored emails, urgent first
    List {
        /// Order by send date only
        #[arg(long)]
        chronological: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show one email with its extracted info and draft reply
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Replace the draft reply of an email
    EditReply {
        id: i64,
        #[command(flatten)]
        source: ReplySource,
    },
    /// Mark an email as resolved
    Resolve { id: i64 },
    /// Counts by status, priority and sentiment
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Check directories, knowledge base, database and model configuration
    Doctor,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ReplySource {
    /// New reply text
    #[arg(long)]
    text: Option<String>,
    /// Read the new reply from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("supportdesk error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Ingest { csv, kb } => {
            if let Some(kb) = kb {
                config.kb_dir = kb;
            }
            ingest(&config, csv).await
        }
        Commands::List {
            chronological,
            json,
        } => list(&config, !chronological, json).await,
        Commands::Show { id, json } => show(&config, id, json).await,
        Commands::EditReply { id, source } => edit_reply(&config, id, source).await,
        Commands::Resolve { id } => {
            let pool = open_store(&config).await?;
            database::update_email_status(&pool, id, EmailStatus::Resolved).await?;
            println!("Email #{} marked as resolved", id);
            Ok(())
        }
        Commands::Stats { json } => stats(&config, json).await,
        Commands::Doctor => doctor(&config).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

async fn open_store(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    config
        .paths
        .init()
        .context("failed to create data directories")?;
    database::init_db(&config.db_path)
        .await
        .with_context(|| format!("failed to open database {}", config.db_path.display()))
}

async fn ingest(config: &AppConfig, csv: PathBuf) -> anyhow::Result<()> {
    let emails = load_from_csv(&csv).with_context(|| format!("failed to read {}", csv.display()))?;
    let total = emails.len();
    let emails = filter_support_emails(emails);
    info!("{} of {} email(s) are support emails", emails.len(), total);

    if emails.is_empty() {
        println!("No eligible support emails found.");
        return Ok(());
    }

    let pool = open_store(config).await?;
    let supervisor = SupervisorHandle::from_config(config, pool).await?;
    let processed = supervisor.process_batch(emails).await?;
    supervisor.shutdown().await;

    println!("Ingested {} email(s):", processed.len());
    for item in &processed {
        println!(
            "  #{:<5} {:<10} {:>4.1}  {:<8}  {:<9}  {}",
            item.id,
            item.record.priority,
            item.record.priority_score,
            item.record.sentiment,
            item.record.draft_source,
            item.record.subject,
        );
    }
    Ok(())
}

fn print_row(email: &EmailRecord) {
    let sent = email
        .sent_date()
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "#{:<5} {:<10} {:>4.1}  {:<8}  {:<8}  {}  {}  (from {})",
        email.id,
        email.priority,
        email.priority_score,
        email.sentiment,
        email.status,
        sent,
        email.subject,
        email.sender,
    );
}

async fn list(config: &AppConfig, order_by_priority: bool, json: bool) -> anyhow::Result<()> {
    let pool = open_store(config).await?;
    let emails = database::list_emails(&pool, order_by_priority).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&emails)?);
    } else if emails.is_empty() {
        println!("No emails found yet. Use `supportdesk ingest --csv <file>`.");
    } else {
        emails.iter().for_each(print_row);
    }
    Ok(())
}

async fn show(config: &AppConfig, id: i64, json: bool) -> anyhow::Result<()> {
    let pool = open_store(config).await?;
    let email = database::get_email(&pool, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&email)?);
        return Ok(());
    }

    print_row(&email);
    println!();
    println!("{}", email.body);
    println!();
    println!(
        "Extracted info:\n{}",
        serde_json::to_string_pretty(&email.extracted_info)?
    );
    println!();
    println!("Draft reply ({}):", email.draft_source);
    println!("{}", email.ai_response);
    Ok(())
}

async fn edit_reply(config: &AppConfig, id: i64, source: ReplySource) -> anyhow::Result<()> {
    let text = match (source.text, source.file) {
        (Some(text), _) => text,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?,
        (None, None) => anyhow::bail!("either --text or --file is required"),
    };

    let pool = open_store(config).await?;
    database::update_ai_response(&pool, id, &text).await?;
    println!("Reply for email #{} updated", id);
    Ok(())
}

async fn stats(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let pool = open_store(config).await?;
    let stats = database::email_stats(&pool).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Total:    {}", stats.total);
    println!("Urgent:   {}", stats.urgent);
    println!("Pending:  {}", stats.pending);
    println!("Resolved: {}", stats.resolved);
    println!("By sentiment:");
    for (label, count) in &stats.by_sentiment {
        println!("  {:<10} {}", label, count);
    }
    println!("By priority:");
    for (label, count) in &stats.by_priority {
        println!("  {:<10} {}", label, count);
    }
    Ok(())
}

async fn doctor(config: &AppConfig) -> anyhow::Result<()> {
    let report = run_preflight_checks(config).await;

    for check in &report.checks {
        let mark = if check.passed { "ok  " } else { "FAIL" };
        println!("[{}] {:<13} {}", mark, check.name, check.message);
        if let Some(details) = &check.details {
            println!("       {}", details);
        }
    }
    println!("{}", report.summary);

    if !report.ready_to_start {
        anyhow::bail!("critical preflight checks failed");
    }
    Ok(())
}
