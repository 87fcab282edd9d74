use super::schema::{CHART_TABLE_NAME, CHART_VERSIONED_SCHEMAS};
use super::ChartStore;
use crate::chart::{parse_date, Observation, RawObservation, DATE_FORMAT};
use crate::sqlite_persistence::{apply_schemas, open_versioned};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, types::Value, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

const SELECT_OBSERVATIONS: &str =
    "SELECT genre, title, artist, rank, date, scraped_at FROM beatport_top100";

#[derive(Clone)]
pub struct SqliteChartStore {
    conn: Arc<Mutex<Connection>>,
}

/// Rank and date are read loosely so that a malformed row produced by an
/// external writer surfaces as a validation failure instead of a query error.
fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
    }
}

fn row_to_raw(row: &Row) -> rusqlite::Result<RawObservation> {
    Ok(RawObservation {
        genre: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        artist: row.get(2)?,
        rank: value_to_string(row.get(3)?),
        date: value_to_string(row.get(4)?),
        scraped_at: match row.get::<_, Value>(5)? {
            Value::Integer(i) => Some(i),
            _ => None,
        },
    })
}

impl SqliteChartStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(&db_path, CHART_VERSIONED_SCHEMAS, "chart")?;
        Ok(SqliteChartStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schemas(&conn, CHART_VERSIONED_SCHEMAS, "chart")?;
        Ok(SqliteChartStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Chart store connection lock poisoned"))
    }

    fn query_observations(&self, sql: &str, genre: Option<&str>) -> Result<Vec<Observation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match genre {
            Some(genre) => stmt
                .query_map(params![genre], row_to_raw)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], row_to_raw)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };

        let total = rows.len();
        let mut observations: Vec<Observation> = rows
            .into_iter()
            .filter_map(|raw| {
                let description = format!("{}/{}@{}", raw.genre, raw.title, raw.date);
                match Observation::try_from(raw) {
                    Ok(observation) => Some(observation),
                    Err(err) => {
                        warn!("Skipping invalid chart row {}: {}", description, err);
                        None
                    }
                }
            })
            .collect();
        observations.sort_by(Observation::listing_order);
        debug!(
            "Loaded {} observations ({} skipped)",
            observations.len(),
            total - observations.len()
        );
        Ok(observations)
    }
}

impl ChartStore for SqliteChartStore {
    fn get_all_observations(&self) -> Result<Vec<Observation>> {
        self.query_observations(SELECT_OBSERVATIONS, None)
    }

    fn get_genre_observations(&self, genre: &str) -> Result<Vec<Observation>> {
        self.query_observations(
            &format!("{} WHERE genre = ?1", SELECT_OBSERVATIONS),
            Some(genre),
        )
    }

    fn insert_observations(&self, observations: &[Observation]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (genre, title, artist, rank, date, scraped_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                CHART_TABLE_NAME
            ))?;
            for observation in observations {
                stmt.execute(params![
                    observation.genre,
                    observation.title,
                    observation.artist,
                    observation.rank,
                    observation.date.format(DATE_FORMAT).to_string(),
                    observation.scraped_at.map(|t| t.timestamp()),
                ])?;
            }
        }
        tx.commit().context("Failed to commit chart observations")?;
        Ok(observations.len())
    }

    fn get_latest_date(&self) -> Result<Option<NaiveDate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT DISTINCT date FROM {}", CHART_TABLE_NAME))?;
        let values = stmt
            .query_map([], |row| row.get::<_, Value>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values
            .into_iter()
            .filter_map(|value| parse_date(&value_to_string(value)).ok())
            .max())
    }

    fn count_observations(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", CHART_TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
