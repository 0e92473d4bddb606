//! dbcheck - SCGDI history database inspector
//!
//! Tails the two history tables the twin server writes:
//! latest variable samples, latest events, totals and a per-severity
//! breakdown.
//!
//! ```text
//! dbcheck
//! dbcheck --limit 20
//! dbcheck --since 2025-08-14T00:00:00
//! dbcheck --watch 2
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use scgdi_store::HistoryStore;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Check SQLite persistence for SCGDI", long_about = None)]
struct Args {
    /// Path to the SQLite history database
    #[clap(long, env = "SCGDI_DB_PATH", default_value = "./scgdi_history.sqlite")]
    db: String,

    /// Rows to show from each table
    #[clap(long, default_value_t = 15)]
    limit: i64,

    /// Filter ts >= ISO timestamp (e.g. 2025-08-14T00:00:00)
    #[clap(long)]
    since: Option<String>,

    /// Repeat every N seconds
    #[clap(long, default_value_t = 0)]
    watch: u64,
}

async fn print_vars(store: &HistoryStore, limit: i64, since: Option<&str>) -> Result<()> {
    for row in store.recent_vars(limit, since).await? {
        let value = row.value.map_or_else(|| "null".to_string(), |v| v.to_string());
        println!(
            "{} {} | {:<44} | {}",
            "[VAR]".green(),
            row.ts,
            row.path,
            value
        );
    }
    Ok(())
}

async fn print_events(store: &HistoryStore, limit: i64, since: Option<&str>) -> Result<()> {
    for row in store.recent_events(limit, since).await? {
        let category = row.category.unwrap_or_default();
        let severity = format!("sev={:<3}", row.severity);
        let severity = if row.severity >= 700 {
            severity.red()
        } else if row.severity >= 250 {
            severity.yellow()
        } else {
            severity.normal()
        };
        println!(
            "{} {} | {:<12} | {} | {}",
            "[EVT]".cyan(),
            row.ts,
            category,
            severity,
            row.message
        );
    }
    Ok(())
}

async fn print_counts(store: &HistoryStore) -> Result<()> {
    let (vars, events) = store.counts().await?;
    println!();
    println!("{} var_history={}  event_history={}", "[COUNT]".bold(), vars, events);
    println!("{} by severity:", "[COUNT]".bold());
    for (severity, count) in store.counts_by_severity().await? {
        println!("  - {}: {}", severity, count);
    }
    Ok(())
}

async fn run_once(store: &HistoryStore, args: &Args, tables: (bool, bool)) -> Result<()> {
    if args.watch > 0 {
        // clear screen between refreshes
        print!("\x1B[2J\x1B[H");
    }
    println!("{} {}", "[DB]".bold(), args.db);
    println!("{}", "=".repeat(80));
    let (has_vars, has_events) = tables;
    if has_vars {
        print_vars(store, args.limit, args.since.as_deref()).await?;
    }
    if has_events {
        println!();
        print_events(store, args.limit, args.since.as_deref()).await?;
    }
    print_counts(store).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let store = HistoryStore::open_readonly(&args.db)
        .await
        .with_context(|| format!("cannot open {}", args.db))?;
    let tables = store.has_tables().await?;
    if tables == (false, false) {
        eprintln!(
            "{} No var_history/event_history in {}. Is the server writing to this DB?",
            "[ERR]".red(),
            args.db
        );
        std::process::exit(2);
    }

    if args.watch > 0 {
        loop {
            run_once(&store, &args, tables).await?;
            tokio::time::sleep(Duration::from_secs(args.watch)).await;
        }
    } else {
        run_once(&store, &args, tables).await?;
    }

    Ok(())
}
