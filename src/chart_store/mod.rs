mod schema;
mod sqlite_chart_store;

pub use sqlite_chart_store::SqliteChartStore;

use crate::chart::Observation;
use anyhow::Result;
use chrono::NaiveDate;

/// Read and append access to recorded chart observations.
///
/// Reads only ever return validated observations; rows that fail
/// validation are skipped and logged.
pub trait ChartStore: Send + Sync {
    /// Every observation, ordered by date descending, then genre, then rank.
    fn get_all_observations(&self) -> Result<Vec<Observation>>;

    /// Observations of a single genre, in the same order.
    fn get_genre_observations(&self, genre: &str) -> Result<Vec<Observation>>;

    /// Appends observations in one transaction. Returns the number of rows written.
    fn insert_observations(&self, observations: &[Observation]) -> Result<usize>;

    fn get_latest_date(&self) -> Result<Option<NaiveDate>>;

    fn count_observations(&self) -> Result<usize>;
}
