mod db;
mod fetch;
mod parser;
mod settings;

use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use settings::Settings;

#[derive(Parser)]
#[command(name = "gadget_scraper", about = "Product page scraper: JSON-LD + characteristics into SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the product page, extract it and save it (get-or-create)
    Scrape {
        /// Product page URL (default: GADGET_URL or the built-in page)
        #[arg(long)]
        url: Option<String>,
        /// SQLite database path (default: GADGET_DB_PATH or data/gadgets.sqlite)
        #[arg(long = "db")]
        db_path: Option<String>,
    },
    /// Extract a saved HTML page and print the record, without saving
    Parse {
        /// Path to an HTML file
        file: String,
    },
    /// Stored gadgets, newest first
    Overview {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// SQLite database path (default: GADGET_DB_PATH or data/gadgets.sqlite)
        #[arg(long = "db")]
        db_path: Option<String>,
    },
    /// Show row counts
    Stats {
        /// SQLite database path (default: GADGET_DB_PATH or data/gadgets.sqlite)
        #[arg(long = "db")]
        db_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { url, db_path } => {
            let mut settings = Settings::load()?;
            if let Some(u) = url {
                settings.url = u;
            }
            if let Some(p) = db_path {
                settings.db_path = p;
            }

            // Network failures end the run here, before extraction.
            let html = fetch::fetch_page(&settings).await?;
            let record = parser::process_page(&html);
            record.print();
            match save(&settings.db_path, &record) {
                SaveOutcome::Created(_) => println!("New gadget saved to database."),
                SaveOutcome::Existing(_) => println!("Gadget already exists in database."),
                SaveOutcome::Failed => {}
            }
        }
        Commands::Parse { file } => {
            parse_file(&file)?.print();
        }
        Commands::Overview { limit, db_path } => {
            let settings = Settings::load()?;
            let conn = db::connect(db_path.as_deref().unwrap_or(&settings.db_path))?;
            let rows = db::fetch_overview(&conn, limit)?;
            if rows.is_empty() {
                println!("No gadgets stored. Run 'scrape' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<40} | {:<10} | {:>8} | {:<16} | {:<10} | {:>4} | {:<19}",
                "id", "Name", "Code", "Price", "Color", "Memory", "Revs", "Saved"
            );
            println!("{}", "-".repeat(135));
            for r in &rows {
                let reviews = r.review_count.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{:>4} | {:<40} | {:<10} | {:>8} | {:<16} | {:<10} | {:>4} | {:<19}",
                    r.id,
                    truncate(&r.full_name, 40),
                    truncate(&r.product_code, 10),
                    r.price_use,
                    truncate(&r.color, 16),
                    truncate(&r.memory_volume, 10),
                    reviews,
                    r.created_at
                );
            }
            println!("\n{} gadgets", rows.len());
        }
        Commands::Stats { db_path } => {
            let settings = Settings::load()?;
            let conn = db::connect(db_path.as_deref().unwrap_or(&settings.db_path))?;
            let s = db::get_stats(&conn)?;
            println!("Rows:           {}", s.total);
            println!("Product codes:  {}", s.distinct_codes);
            println!("Without code:   {}", s.without_code);
        }
    }

    info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

/// Offline extraction: no settings, network or database involved.
fn parse_file(path: &str) -> anyhow::Result<parser::ProductRecord> {
    let html = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    Ok(parser::process_page(&html))
}

#[derive(Debug, PartialEq)]
enum SaveOutcome {
    Created(i64),
    Existing(i64),
    /// Already logged; the run ends normally.
    Failed,
}

/// Storage errors are reported, not propagated: the run still ends cleanly.
fn save(db_path: &str, record: &parser::ProductRecord) -> SaveOutcome {
    let result = db::connect(db_path).and_then(|conn| db::get_or_create(&conn, &record.to_row()));
    match result {
        Ok((id, true)) => {
            info!("Inserted gadget id={}", id);
            SaveOutcome::Created(id)
        }
        Ok((id, false)) => {
            info!("Matched existing gadget id={}", id);
            SaveOutcome::Existing(id)
        }
        Err(e) => {
            error!("Database error: {:#}", e);
            SaveOutcome::Failed
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
