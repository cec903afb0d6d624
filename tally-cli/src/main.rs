use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::dates::{parse_flexible_date, to_iso};
use tally_core::{Transaction, period_for_date};
use tally_finance::export::write_csv;
use tally_finance::{
    HttpTransactionStore, ImportError, ImportReport, StatementImporter, categorize_merchant, normalize_records, preview_fragments,
};
use tally_ingest::TextFragment;
use tally_ingest::decode::{fragments_from_json, fragments_from_pdf};
use tracing::info;
use tracing_subscriber::prelude::*;

mod config;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Credit card statement importer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement and persist new or changed transactions to the store
    Import {
        /// Statement PDF, or a JSON array of text fragments
        file: PathBuf,

        /// Print the import report as JSON
        #[arg(long)]
        json: bool,

        /// Parse and show what would be imported without touching the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse a statement and print the transactions (no store access)
    Parse {
        file: PathBuf,

        #[arg(long)]
        json: bool,

        /// Also write the transactions to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Re-import previously exported records (JSON array)
    Reimport {
        file: PathBuf,

        #[arg(long)]
        dry_run: bool,
    },

    /// Show the category a merchant description maps to
    Classify {
        #[arg(required = true)]
        merchant: Vec<String>,
    },

    /// Show the statement period a date belongs to
    Period { date: String },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config (API key redacted)
    Show,
}

fn get_rust_log() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(get_rust_log()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Import { file, json, dry_run } => {
            if dry_run {
                let txns = parse_file(&file)?;
                print_transactions(&txns, json)?;
                println!("\n{} transactions would be submitted (dry run)", txns.len());
                return Ok(());
            }
            let cfg = config::load_config()?;
            // Missing credentials fail before any parsing work.
            let store = HttpTransactionStore::new(&cfg.store).context(
                "store is not configured (set TALLY_STORE_API_KEY or [store].api_key in ~/.tally/config.toml)",
            )?;
            let fragments = read_fragments(&file)?;
            let importer = StatementImporter::new(store).with_diagnostic_lines(cfg.parser.diagnostic_lines);
            match importer.import_fragments(&fragments).await {
                Ok(report) => print_report(&report, json)?,
                Err(e) => {
                    report_unsaved(&e)?;
                    bail!("import failed: {e}");
                }
            }
        }

        Command::Parse { file, json, csv } => {
            let txns = parse_file(&file)?;
            print_transactions(&txns, json)?;
            if let Some(out) = csv {
                write_csv(&out, &txns)?;
                info!(path = %out.display(), count = txns.len(), "wrote csv");
            }
        }

        Command::Reimport { file, dry_run } => {
            let raw = fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;
            let records: Vec<serde_json::Value> =
                serde_json::from_str(&raw).with_context(|| format!("parse {} as a JSON array", file.display()))?;

            if dry_run {
                let batch = normalize_records(&records);
                print_transactions(&batch.transactions, false)?;
                println!(
                    "\n{} valid, {} rejected (dry run)",
                    batch.transactions.len(),
                    batch.rejected
                );
                return Ok(());
            }

            let cfg = config::load_config()?;
            let store = HttpTransactionStore::new(&cfg.store).context("store is not configured")?;
            let importer = StatementImporter::new(store);
            match importer.import_records(&records).await {
                Ok(report) => print_report(&report, false)?,
                Err(e) => {
                    report_unsaved(&e)?;
                    bail!("re-import failed: {e}");
                }
            }
        }

        Command::Classify { merchant } => {
            let text = merchant.join(" ");
            let class = categorize_merchant(&text);
            println!("{} / {}", class.category, class.subcategory);
        }

        Command::Period { date } => {
            let Some(d) = parse_flexible_date(&date) else {
                bail!("unrecognised date: {date}");
            };
            let p = period_for_date(d);
            println!("date:            {}", to_iso(d));
            println!("statement_id:    {}", p.statement_id.unwrap_or_default());
            println!("statement_start: {}", p.statement_start.unwrap_or_default());
            println!("statement_end:   {}", p.statement_end.unwrap_or_default());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn read_fragments(path: &Path) -> Result<Vec<TextFragment>> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let fragments = if is_json {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        fragments_from_json(&s)?
    } else {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        fragments_from_pdf(&bytes)?
    };
    info!(path = %path.display(), fragments = fragments.len(), "decoded statement");
    Ok(fragments)
}

fn parse_file(path: &Path) -> Result<Vec<Transaction>> {
    let cfg = config::load_config()?;
    let fragments = read_fragments(path)?;
    let preview = preview_fragments(&fragments, cfg.parser.diagnostic_lines);
    match preview.format {
        Some(format) => info!(format, count = preview.transactions.len(), "parsed statement"),
        None => eprintln!("No statement format recognised (see log for diagnostics)"),
    }
    Ok(preview.transactions)
}

fn print_transactions(txns: &[Transaction], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(txns)?);
        return Ok(());
    }
    for t in txns {
        println!(
            "{} | {:>10} | {:<40} | {} / {}",
            t.date_iso, t.amount, t.place, t.category, t.subcategory
        );
    }
    Ok(())
}

/// Show what was extracted before a store failure so the work is not lost.
fn report_unsaved(err: &ImportError) -> Result<()> {
    if err.transactions.is_empty() {
        return Ok(());
    }
    eprintln!("{} transactions were extracted before the failure:", err.transactions.len());
    print_transactions(&err.transactions, false)
}

fn print_report(report: &ImportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    print_transactions(&report.transactions, false)?;
    println!(
        "\nextracted={} duplicates={} updated={} saved={}",
        report.count, report.duplicate_count, report.updated, report.saved
    );
    if let Some(msg) = &report.message {
        println!("{msg}");
    }
    Ok(())
}
