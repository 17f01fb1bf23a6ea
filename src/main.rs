use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, warn};
use serde::Serialize;

use std::path::PathBuf;

use ubs_export::{AccountExport, BookedFlag, CardExport, HeaderPolicy, ParserConfig};

/// Command-line arguments structure.
#[derive(Parser, Debug)]
#[clap(version, about = "Parse UBS e-banking CSV exports")]
struct Args {
    /// Print the export summary instead of the transactions.
    #[clap(long, global = true)]
    summary: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Account statement export.
    Account {
        /// Path to the export file.
        path: PathBuf,
        /// Accepted wording of the transaction table header.
        #[clap(long, value_enum, default_value = "either")]
        header: Header,
    },
    /// Credit card export.
    Card {
        /// Path to the export file.
        path: PathBuf,
        /// Only accept true/false, yes/no or 1/0 in the Booked column.
        #[clap(long)]
        strict_booked: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Header {
    Canonical,
    Legacy,
    Either,
}

impl From<Header> for HeaderPolicy {
    fn from(header: Header) -> Self {
        match header {
            Header::Canonical => HeaderPolicy::Canonical,
            Header::Legacy => HeaderPolicy::Legacy,
            Header::Either => HeaderPolicy::Either,
        }
    }
}

fn write_csv<'a, T: Serialize + 'a>(rows: impl IntoIterator<Item = &'a T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn account(path: PathBuf, header: Header, summary: bool) -> Result<()> {
    let config = ParserConfig::default().with_header(header.into());
    let export = AccountExport::from_path_with(&path, &config)
        .with_context(|| format!("Failed to parse account export {}", path.display()))?;

    let duplicates = export.duplicate_keys();
    if !duplicates.is_empty() {
        warn!("Repeated transaction numbers: {}", duplicates.join(", "));
    }

    if summary {
        println!("Account number: {}", export.account_number());
        println!("IBAN:           {}", export.iban());
        println!("Period:         {} to {}", export.from_date(), export.until_date());
        println!(
            "Balance:        {} -> {} {}",
            export.opening_balance(),
            export.closing_balance(),
            export.valued_in()
        );
        println!(
            "Transactions:   {} ({} distinct)",
            export.number_of_transactions(),
            export.distinct_transactions()
        );
        return Ok(());
    }
    write_csv(export.transactions())
}

fn card(path: PathBuf, strict_booked: bool, summary: bool) -> Result<()> {
    let booked = if strict_booked {
        BookedFlag::StrictToken
    } else {
        BookedFlag::NonEmpty
    };
    let config = ParserConfig::default().with_booked(booked);
    let export = CardExport::from_path_with(&path, &config)
        .with_context(|| format!("Failed to parse card export {}", path.display()))?;

    let duplicates = export.duplicate_keys().len();
    if duplicates > 0 {
        warn!("{} card transactions appear more than once", duplicates);
    }

    if summary {
        let booked = export.transactions().iter().filter(|tx| tx.booked).count();
        println!(
            "Transactions: {} ({} distinct, {} booked)",
            export.transactions().len(),
            export.distinct_transactions(),
            booked
        );
        return Ok(());
    }
    write_csv(export.transactions())
}

fn run() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Account { path, header } => account(path, header, args.summary),
        Command::Card {
            path,
            strict_booked,
        } => card(path, strict_booked, args.summary),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // exit with non-zero code on fatal error
    if let Err(err) = run() {
        error!("Fatal error: {:?}", err);
        std::process::exit(1);
    }
}
