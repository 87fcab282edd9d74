use super::genres::genre_display_name;
use super::trend::collapse_by_date;
use super::Observation;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub rank: u32,
}

/// Summary of a single track's chart life, as shown on its detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackHistory {
    pub genre: String,
    pub genre_name: String,
    pub title: String,
    pub artist: Option<String>,
    pub current_rank: u32,
    pub peak_rank: u32,
    pub first_appeared: NaiveDate,
    pub latest_date: NaiveDate,
    pub appearances: usize,
    pub points: Vec<HistoryPoint>,
}

impl TrackHistory {
    /// Expects observations of one track, e.g. the output of `slug::resolve`.
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        let by_date = collapse_by_date(observations);
        let (&first_appeared, _) = by_date.iter().next()?;
        let (&latest_date, &latest) = by_date.iter().next_back()?;
        let peak_rank = by_date.values().map(|o| o.rank).min()?;

        let points = by_date
            .iter()
            .map(|(&date, o)| HistoryPoint { date, rank: o.rank })
            .collect();

        Some(TrackHistory {
            genre: latest.genre.clone(),
            genre_name: genre_display_name(&latest.genre),
            title: latest.title.clone(),
            artist: latest.artist.clone(),
            current_rank: latest.rank,
            peak_rank,
            first_appeared,
            latest_date,
            appearances: observations.len(),
            points,
        })
    }
}
