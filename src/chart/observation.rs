use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single recorded chart placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub genre: String,
    pub title: String,
    pub artist: Option<String>,
    pub rank: u32,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scraped_at: Option<DateTime<Utc>>,
}

/// A row as it comes out of the store or a scraper CSV, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawObservation {
    pub genre: String,
    pub title: String,
    pub artist: Option<String>,
    pub rank: String,
    pub date: String,
    pub scraped_at: Option<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObservationError {
    #[error("genre is empty")]
    EmptyGenre,

    #[error("title is empty")]
    EmptyTitle,

    #[error("rank {0:?} is not an integer")]
    InvalidRank(String),

    #[error("rank {0} is not positive")]
    NonPositiveRank(i64),

    #[error("date {0:?} is not a YYYY-MM-DD date")]
    InvalidDate(String),

    #[error("scrape timestamp {0} is out of range")]
    InvalidScrapedAt(i64),
}

pub fn parse_rank(value: &str) -> Result<u32, ObservationError> {
    let trimmed = value.trim();
    let rank: i64 = trimmed
        .parse()
        .map_err(|_| ObservationError::InvalidRank(value.to_string()))?;
    if rank < 1 {
        return Err(ObservationError::NonPositiveRank(rank));
    }
    u32::try_from(rank).map_err(|_| ObservationError::InvalidRank(value.to_string()))
}

/// Only zero-padded `YYYY-MM-DD` is accepted, so stored dates sort the same
/// as text and as dates.
pub fn parse_date(value: &str) -> Result<NaiveDate, ObservationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == trimmed)
        .ok_or_else(|| ObservationError::InvalidDate(value.to_string()))
}

impl TryFrom<RawObservation> for Observation {
    type Error = ObservationError;

    fn try_from(raw: RawObservation) -> Result<Self, Self::Error> {
        let genre = raw.genre.trim();
        if genre.is_empty() {
            return Err(ObservationError::EmptyGenre);
        }
        let title = raw.title.trim();
        if title.is_empty() {
            return Err(ObservationError::EmptyTitle);
        }
        let artist = raw
            .artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        let rank = parse_rank(&raw.rank)?;
        let date = parse_date(&raw.date)?;
        let scraped_at = match raw.scraped_at {
            Some(secs) => Some(
                DateTime::<Utc>::from_timestamp(secs, 0)
                    .ok_or(ObservationError::InvalidScrapedAt(secs))?,
            ),
            None => None,
        };

        Ok(Observation {
            genre: genre.to_string(),
            title: title.to_string(),
            artist,
            rank,
            date,
            scraped_at,
        })
    }
}

impl Observation {
    /// Listing order of the read endpoint: date descending, then genre, then rank.
    pub fn listing_order(a: &Observation, b: &Observation) -> Ordering {
        b.date
            .cmp(&a.date)
            .then_with(|| a.genre.cmp(&b.genre))
            .then_with(|| a.rank.cmp(&b.rank))
    }
}
