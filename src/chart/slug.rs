use super::Observation;
use serde::Serialize;
use thiserror::Error;

pub const UNKNOWN_ARTIST_SLUG: &str = "unknown-artist";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no chart entries for {genre}/{title}/{artist}")]
    NotFound {
        genre: String,
        title: String,
        artist: String,
    },
}

/// Lowercases, turns every run of non-alphanumeric characters into one
/// hyphen, and strips hyphens at both ends.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Artist segment of a track path. Artists that slugify to nothing share
/// the placeholder with tracks that have no artist.
pub fn artist_slug(artist: Option<&str>) -> String {
    artist
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST_SLUG.to_string())
}

/// Path segments identifying a track in navigation links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSlug {
    pub genre: String,
    pub title: String,
    pub artist: String,
}

impl TrackSlug {
    pub fn new(genre: &str, title: &str, artist: Option<&str>) -> Self {
        TrackSlug {
            genre: genre.trim().to_lowercase(),
            title: slugify(title),
            artist: artist_slug(artist),
        }
    }

    pub fn of(observation: &Observation) -> Self {
        Self::new(
            &observation.genre,
            &observation.title,
            observation.artist.as_deref(),
        )
    }

    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.genre, self.title, self.artist)
    }

    fn matches(&self, observation: &Observation) -> bool {
        &TrackSlug::of(observation) == self
    }
}

/// All observations of the track addressed by the given slugs, most recent first.
///
/// Incoming slugs are slugified again, which folds case and is a no-op for
/// slugs produced by [`slugify`].
pub fn resolve(
    observations: &[Observation],
    genre: &str,
    title_slug: &str,
    artist_slug_segment: &str,
) -> Result<Vec<Observation>, LookupError> {
    let wanted = TrackSlug {
        genre: genre.trim().to_lowercase(),
        title: slugify(title_slug),
        artist: artist_slug(Some(artist_slug_segment)),
    };

    let mut matches: Vec<Observation> = observations
        .iter()
        .filter(|o| wanted.matches(o))
        .cloned()
        .collect();

    if matches.is_empty() {
        return Err(LookupError::NotFound {
            genre: wanted.genre,
            title: wanted.title,
            artist: wanted.artist,
        });
    }

    matches.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.rank.cmp(&b.rank)));
    Ok(matches)
}
