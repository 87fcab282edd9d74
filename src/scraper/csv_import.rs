//! Import of the CSV files written by the scraper.
//!
//! The scraper writes one file per day, `beatport_top100_<YYYY-MM-DD>.csv`,
//! with the columns `genre,title,artists,rank`. The chart date is not part of
//! the rows and comes from the file name unless given explicitly.

use crate::chart::{parse_date, Observation, RawObservation, DATE_FORMAT};
use crate::chart_store::ChartStore;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::StringRecord;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub const CSV_FILE_PREFIX: &str = "beatport_top100_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvImportError {
    #[error("file is empty")]
    Empty,

    #[error("header is missing the {0:?} column")]
    MissingColumn(&'static str),

    #[error("unreadable header: {0}")]
    Header(String),

    #[error("no chart date in file name {0:?}")]
    NoDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

pub fn csv_file_name(date: NaiveDate) -> String {
    format!("{}{}.csv", CSV_FILE_PREFIX, date.format(DATE_FORMAT))
}

pub fn date_from_file_name(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    let date = stem.strip_prefix(CSV_FILE_PREFIX)?;
    parse_date(date).ok()
}

fn normalize_header_name(name: &str) -> String {
    // spreadsheet exports may prefix the first header with a BOM
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

struct Header {
    genre: usize,
    title: usize,
    artists: usize,
    rank: usize,
}

impl Header {
    fn parse(headers: &StringRecord) -> Result<Self, CsvImportError> {
        let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
        if names.iter().all(|n| n.is_empty()) {
            return Err(CsvImportError::Empty);
        }
        let find = |candidates: &[&str], label: &'static str| {
            names
                .iter()
                .position(|n| candidates.contains(&n.as_str()))
                .ok_or(CsvImportError::MissingColumn(label))
        };
        Ok(Header {
            genre: find(&["genre", "genre_slug"], "genre")?,
            title: find(&["title"], "title")?,
            artists: find(&["artists", "artist"], "artists")?,
            rank: find(&["rank"], "rank")?,
        })
    }

    fn raw(&self, record: &StringRecord, date: NaiveDate, scraped_at: i64) -> Option<RawObservation> {
        let cell = |i: usize| record.get(i).map(str::to_string);
        Some(RawObservation {
            genre: cell(self.genre)?,
            title: cell(self.title)?,
            artist: cell(self.artists),
            rank: cell(self.rank)?,
            date: date.format(DATE_FORMAT).to_string(),
            scraped_at: Some(scraped_at),
        })
    }
}

fn record_line(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

/// Validates every data row of a scraper CSV. Rows that fail are returned
/// with their line number instead of aborting the import.
pub fn read_observations(
    text: &str,
    date: NaiveDate,
    scraped_at: DateTime<Utc>,
) -> Result<(Vec<Observation>, Vec<RejectedRow>), CsvImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvImportError::Header(e.to_string()))?
        .clone();
    let header = Header::parse(&headers)?;

    let mut observations = vec![];
    let mut rejected = vec![];
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                rejected.push(RejectedRow {
                    line,
                    reason: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };
        let line = record_line(&record);
        let result = header
            .raw(&record, date, scraped_at.timestamp())
            .ok_or_else(|| format!("expected {} fields, found {}", headers.len(), record.len()))
            .and_then(|raw| Observation::try_from(raw).map_err(|e| e.to_string()));
        match result {
            Ok(observation) => observations.push(observation),
            Err(reason) => rejected.push(RejectedRow { line, reason }),
        }
    }
    Ok((observations, rejected))
}

/// Reads a scraper CSV from disk and appends its valid rows to `store`.
pub fn import_csv_file(
    store: &dyn ChartStore,
    path: &Path,
    date: Option<NaiveDate>,
) -> Result<ImportReport> {
    let date = match date {
        Some(date) => date,
        None => date_from_file_name(path)
            .ok_or_else(|| CsvImportError::NoDate(path.display().to_string()))?,
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (observations, rejected) = read_observations(&text, date, Utc::now())
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    for row in &rejected {
        warn!("{}:{}: rejected row: {}", path.display(), row.line, row.reason);
    }
    let imported = store.insert_observations(&observations)?;
    info!(
        "Imported {} rows for {} from {} ({} rejected)",
        imported,
        date,
        path.display(),
        rejected.len()
    );
    Ok(ImportReport { imported, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_store::SqliteChartStore;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn handles_quotes_crlf_and_blank_lines() {
        let csv = "genre,title,artists,rank\r\n\r\n\
                   house,\"Say \"\"Hi\"\", Remix\",\" A \",1\r\n";
        let (observations, rejected) = read_observations(csv, day(), Utc::now()).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].title, "Say \"Hi\", Remix");
        assert_eq!(observations[0].artist.as_deref(), Some("A"));
    }

    #[test]
    fn quoted_newline_keeps_line_numbers() {
        let csv = "genre,title,artists,rank\nhouse,\"multi\nline\",X,1\nhouse,Next,X,zero\n";
        let (observations, rejected) = read_observations(csv, day(), Utc::now()).unwrap();
        assert_eq!(observations[0].title, "multi\nline");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].line, 4);
    }

    #[test]
    fn header_may_start_with_bom() {
        let csv = "\u{feff}Genre,Title,Artists,Rank\nhouse,A,X,1\n";
        let (observations, _) = read_observations(csv, day(), Utc::now()).unwrap();
        assert_eq!(observations.len(), 1);
    }

    #[test]
    fn reads_scraper_output() {
        let csv = "genre,title,artists,rank\n\
                   house,Track One,Artist A & Artist B,1\n\
                   house,\"Two, Extended\",,2\n";
        let (observations, rejected) = read_observations(csv, day(), Utc::now()).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].artist.as_deref(), Some("Artist A & Artist B"));
        assert_eq!(observations[1].title, "Two, Extended");
        assert_eq!(observations[1].artist, None);
        assert!(observations.iter().all(|o| o.date == day()));
    }

    #[test]
    fn rejects_bad_rows_with_line_numbers() {
        let csv = "genre,title,artists,rank\n\
                   house,Good,X,1\n\
                   house,Zero,X,0\n\
                   house,Words,X,abc\n\
                   house,Short\n\
                   ,NoGenre,X,4\n";
        let (observations, rejected) = read_observations(csv, day(), Utc::now()).unwrap();
        assert_eq!(observations.len(), 1);
        let lines: Vec<usize> = rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
        assert!(rejected[2].reason.contains("expected 4 fields"));
    }

    #[test]
    fn header_columns_can_be_reordered() {
        let csv = "rank,genre,artists,title\n3,techno,Someone,Name\n";
        let (observations, _) = read_observations(csv, day(), Utc::now()).unwrap();
        assert_eq!(observations[0].rank, 3);
        assert_eq!(observations[0].title, "Name");
    }

    #[test]
    fn missing_header_column_is_an_error() {
        assert_eq!(
            read_observations("genre,title,rank\n", day(), Utc::now()).unwrap_err(),
            CsvImportError::MissingColumn("artists")
        );
        assert_eq!(
            read_observations("", day(), Utc::now()).unwrap_err(),
            CsvImportError::Empty
        );
    }

    #[test]
    fn date_comes_from_file_name() {
        assert_eq!(csv_file_name(day()), "beatport_top100_2024-04-02.csv");
        assert_eq!(
            date_from_file_name(&PathBuf::from("/tmp/beatport_top100_2024-04-02.csv")),
            Some(day())
        );
        assert_eq!(date_from_file_name(&PathBuf::from("charts.csv")), None);
    }

    #[test]
    fn imports_file_into_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(csv_file_name(day()));
        std::fs::write(&path, "genre,title,artists,rank\nhouse,A,X,1\nhouse,B,Y,-1\n").unwrap();
        let store = SqliteChartStore::in_memory().unwrap();

        let report = import_csv_file(&store, &path, None).unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(store.get_latest_date().unwrap(), Some(day()));
    }

    #[test]
    fn import_without_date_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("charts.csv");
        std::fs::write(&path, "genre,title,artists,rank\n").unwrap();
        let store = SqliteChartStore::in_memory().unwrap();
        assert!(import_csv_file(&store, &path, None).is_err());
    }
}
