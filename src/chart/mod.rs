//! Chart domain: observations, track identity, trends and the derived views.

pub mod genres;
mod history;
mod identity;
mod observation;
mod slug;
mod status;
mod trend;
pub mod view;

pub use history::{HistoryPoint, TrackHistory};
pub use identity::{normalize_text, TrackIdentity};
pub use observation::{parse_date, parse_rank, Observation, ObservationError, RawObservation, DATE_FORMAT};
pub use slug::{resolve, slugify, LookupError, TrackSlug, UNKNOWN_ARTIST_SLUG};
pub use status::{ChartStatus, Staleness};
pub use trend::{collapse_by_date, compute_trends, format_trend, latest_chart, TrendRecord};
