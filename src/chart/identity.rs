use super::Observation;
use serde::Serialize;

/// Key deciding whether two observations are the same track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TrackIdentity {
    pub genre: String,
    pub title: String,
    pub artist: String,
}

pub fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

impl TrackIdentity {
    pub fn new(genre: &str, title: &str, artist: Option<&str>) -> Self {
        TrackIdentity {
            genre: genre.to_string(),
            title: normalize_text(title),
            artist: normalize_text(artist.unwrap_or("")),
        }
    }

    pub fn of(observation: &Observation) -> Self {
        Self::new(
            &observation.genre,
            &observation.title,
            observation.artist.as_deref(),
        )
    }
}
