//! Rank movement and first appearance per track.
//!
//! Observations are grouped into series by [`TrackIdentity`], every series is
//! collapsed to one entry per date (the best rank of that date wins), and the
//! two most recent dates give the trend: `previous_rank - latest_rank`, so a
//! positive value means the track climbed.

use super::{Observation, TrackIdentity};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    #[serde(skip)]
    pub identity: TrackIdentity,
    pub genre: String,
    pub title: String,
    pub artist: Option<String>,
    pub latest_rank: u32,
    pub latest_date: NaiveDate,
    /// None when the series has a single distinct date.
    pub trend: Option<i64>,
    pub first_appeared: NaiveDate,
}

impl TrendRecord {
    pub fn trend_label(&self) -> String {
        format_trend(self.trend)
    }
}

pub fn format_trend(trend: Option<i64>) -> String {
    match trend {
        Some(t) if t > 0 => format!("↑ +{}", t),
        Some(t) if t < 0 => format!("↓ {}", t),
        Some(_) => "→ 0".to_string(),
        None => "—".to_string(),
    }
}

/// Best observation per date, ascending by date.
pub fn collapse_by_date<'a, I>(observations: I) -> BTreeMap<NaiveDate, &'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut by_date: BTreeMap<NaiveDate, &Observation> = BTreeMap::new();
    for observation in observations {
        by_date
            .entry(observation.date)
            .and_modify(|best| {
                if observation.rank < best.rank {
                    *best = observation;
                }
            })
            .or_insert(observation);
    }
    by_date
}

fn record_for_series(identity: TrackIdentity, series: &[&Observation]) -> Option<TrendRecord> {
    let by_date = collapse_by_date(series.iter().copied());
    let mut newest_first = by_date.values().rev();
    let latest = *newest_first.next()?;
    let trend = newest_first
        .next()
        .map(|previous| previous.rank as i64 - latest.rank as i64);
    let first_appeared = *by_date.keys().next()?;

    Some(TrendRecord {
        genre: latest.genre.clone(),
        title: latest.title.clone(),
        artist: latest.artist.clone(),
        identity,
        latest_rank: latest.rank,
        latest_date: latest.date,
        trend,
        first_appeared,
    })
}

/// One record per track identity, over the whole history in `observations`.
pub fn compute_trends(observations: &[Observation]) -> Vec<TrendRecord> {
    let mut series: HashMap<TrackIdentity, Vec<&Observation>> = HashMap::new();
    for observation in observations {
        series
            .entry(TrackIdentity::of(observation))
            .or_default()
            .push(observation);
    }

    let mut records: Vec<TrendRecord> = series
        .into_iter()
        .filter_map(|(identity, series)| record_for_series(identity, &series))
        .collect();

    records.sort_by(|a, b| {
        b.latest_date
            .cmp(&a.latest_date)
            .then_with(|| a.genre.cmp(&b.genre))
            .then_with(|| a.latest_rank.cmp(&b.latest_rank))
            .then_with(|| a.identity.cmp(&b.identity))
    });
    records
}

/// Records of `genre` that were on its most recent chart, best rank first.
pub fn latest_chart(records: &[TrendRecord], genre: &str) -> Vec<TrendRecord> {
    let latest_date = match records
        .iter()
        .filter(|r| r.genre == genre)
        .map(|r| r.latest_date)
        .max()
    {
        Some(date) => date,
        None => return vec![],
    };

    let mut chart: Vec<TrendRecord> = records
        .iter()
        .filter(|r| r.genre == genre && r.latest_date == latest_date)
        .cloned()
        .collect();
    chart.sort_by(|a, b| {
        a.latest_rank
            .cmp(&b.latest_rank)
            .then_with(|| a.identity.cmp(&b.identity))
    });
    chart
}
