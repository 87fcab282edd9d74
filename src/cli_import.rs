//! Chart Import Tool
//!
//! Imports CSV files written by the Beatport scraper into the chart database.

use anyhow::{bail, Result};
use beatport_charts_server::chart::parse_date;
use beatport_charts_server::chart_store::SqliteChartStore;
use beatport_charts_server::scraper::import_csv_file;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn parse_chart_date(s: &str) -> Result<NaiveDate> {
    Ok(parse_date(s)?)
}

#[derive(Parser, Debug)]
#[command(name = "cli-import")]
#[command(about = "Import Beatport scraper CSV files into the chart database")]
struct Args {
    /// Path to the SQLite chart database file
    #[arg(value_name = "DB_PATH")]
    db_path: PathBuf,

    /// CSV files named beatport_top100_<YYYY-MM-DD>.csv
    #[arg(value_name = "CSV", required = true)]
    csv_files: Vec<PathBuf>,

    /// Chart date for every file, instead of the one in the file name
    #[arg(long, value_parser = parse_chart_date)]
    date: Option<NaiveDate>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let store = SqliteChartStore::new(&args.db_path)?;

    let mut imported = 0;
    let mut rejected = 0;
    let mut failed_files = 0;
    for path in &args.csv_files {
        match import_csv_file(&store, path, args.date) {
            Ok(report) => {
                imported += report.imported;
                rejected += report.rejected.len();
            }
            Err(e) => {
                error!("{}: {:#}", path.display(), e);
                failed_files += 1;
            }
        }
    }

    info!(
        "Done: {} rows imported, {} rejected, {} of {} files failed",
        imported,
        rejected,
        failed_files,
        args.csv_files.len()
    );
    if rejected > 0 {
        warn!("Rejected rows were logged above with their line numbers");
    }
    if failed_files > 0 {
        bail!("{} file(s) could not be imported", failed_files);
    }
    Ok(())
}
