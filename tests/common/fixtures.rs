//! Test database creation

use super::constants::*;
use anyhow::Result;
use beatport_charts_server::chart::{parse_date, Observation};
use beatport_charts_server::chart_store::{ChartStore, SqliteChartStore};
use std::path::PathBuf;
use tempfile::TempDir;

fn observation(
    genre: &str,
    title: &str,
    artist: Option<&str>,
    rank: u32,
    date: &str,
) -> Result<Observation> {
    Ok(Observation {
        genre: genre.to_string(),
        title: title.to_string(),
        artist: artist.map(str::to_string),
        rank,
        date: parse_date(date)?,
        scraped_at: None,
    })
}

/// The rows described in [`super::constants`]
pub fn seeded_observations() -> Result<Vec<Observation>> {
    Ok(vec![
        observation(HOUSE, CLIMBER_TITLE, Some(CLIMBER_ARTIST), 3, PREVIOUS_DATE)?,
        observation(HOUSE, STEADY_TITLE, Some(STEADY_ARTIST), 5, PREVIOUS_DATE)?,
        observation(HOUSE, FALLER_TITLE, Some(FALLER_ARTIST), 8, PREVIOUS_DATE)?,
        observation(HOUSE, DROPPED_TITLE, Some(DROPPED_ARTIST), 1, PREVIOUS_DATE)?,
        observation(HOUSE, CLIMBER_TITLE, Some(CLIMBER_ARTIST), 1, LATEST_DATE)?,
        observation(HOUSE, CLIMBER_TITLE, Some(CLIMBER_ARTIST), 4, LATEST_DATE)?,
        observation(HOUSE, NEWCOMER_TITLE, None, 2, LATEST_DATE)?,
        observation(HOUSE, STEADY_TITLE, Some(STEADY_ARTIST), 5, LATEST_DATE)?,
        observation(HOUSE, FALLER_TITLE, Some(FALLER_ARTIST), 10, LATEST_DATE)?,
        observation(TECHNO, PULSE_TITLE, Some(PULSE_ARTIST), 1, PREVIOUS_DATE)?,
    ])
}

/// Creates a temporary database without chart rows.
/// Returns (temp_dir, db_path)
pub fn create_empty_db() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("charts.db");
    SqliteChartStore::new(&db_path)?;
    Ok((dir, db_path))
}

/// Creates a temporary database seeded with the test chart.
/// Returns (temp_dir, db_path)
pub fn create_test_db() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("charts.db");
    let store = SqliteChartStore::new(&db_path)?;
    let inserted = store.insert_observations(&seeded_observations()?)?;
    anyhow::ensure!(inserted == TOTAL_ROWS, "seeded {} rows", inserted);
    Ok((dir, db_path))
}
