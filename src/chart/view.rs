//! Server-side rendering of the chart table: genre selection, sorting,
//! search and pagination over trend records.

use super::genres::{default_genre, genre_display_name};
use super::slug::TrackSlug;
use super::trend::{latest_chart, TrendRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown sort column {0:?}")]
    UnknownSortColumn(String),

    #[error("unknown sort direction {0:?}")]
    UnknownSortDirection(String),

    #[error("unknown theme {0:?}")]
    UnknownTheme(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    #[default]
    Rank,
    Trend,
    Title,
    Artist,
    FirstAppeared,
}

impl FromStr for SortColumn {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rank" => Ok(SortColumn::Rank),
            "trend" => Ok(SortColumn::Trend),
            "title" => Ok(SortColumn::Title),
            "artist" => Ok(SortColumn::Artist),
            "firstappeared" | "first_appeared" | "first-appeared" => {
                Ok(SortColumn::FirstAppeared)
            }
            _ => Err(ViewError::UnknownSortColumn(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ViewError::UnknownSortDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ViewError::UnknownTheme(s.to_string())),
        }
    }
}

/// Everything the dashboard needs to reproduce a table, passed in and handed
/// back instead of living in globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub genre: String,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
    pub search: String,
    pub page: usize,
    pub page_size: usize,
    pub theme: Theme,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            genre: default_genre().slug().to_string(),
            sort_column: SortColumn::default(),
            sort_direction: SortDirection::default(),
            search: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            theme: Theme::default(),
        }
    }
}

impl ViewState {
    /// Clicking the current column flips the direction, another column
    /// starts ascending.
    pub fn toggle_sort(self, column: SortColumn) -> Self {
        let sort_direction = if self.sort_column == column {
            self.sort_direction.flipped()
        } else {
            SortDirection::Asc
        };
        ViewState {
            sort_column: column,
            sort_direction,
            ..self
        }
    }

    pub fn toggle_theme(self) -> Self {
        let theme = match self.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        ViewState { theme, ..self }
    }

    pub fn with_genre(self, genre: &str) -> Self {
        ViewState {
            genre: genre.to_string(),
            page: 1,
            ..self
        }
    }

    pub fn with_search(self, search: &str) -> Self {
        ViewState {
            search: search.to_string(),
            page: 1,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    pub rank: u32,
    pub trend: Option<i64>,
    pub trend_label: String,
    pub title: String,
    pub artist: Option<String>,
    pub artist_count: usize,
    pub first_appeared: NaiveDate,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub genre: String,
    pub genre_name: String,
    pub date: Option<NaiveDate>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
    pub rows: Vec<ChartRow>,
    pub view: ViewState,
}

fn compare(a: &TrendRecord, b: &TrendRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Rank => a.latest_rank.cmp(&b.latest_rank),
        SortColumn::Trend => a.trend.cmp(&b.trend),
        SortColumn::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortColumn::Artist => artist_key(a).cmp(&artist_key(b)),
        SortColumn::FirstAppeared => a.first_appeared.cmp(&b.first_appeared),
    }
}

fn artist_key(record: &TrendRecord) -> String {
    record.artist.as_deref().unwrap_or("").to_lowercase()
}

fn matches_search(record: &TrendRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.title.to_lowercase().contains(needle)
        || artist_key(record).contains(needle)
}

pub fn render(records: &[TrendRecord], view: &ViewState) -> ChartView {
    let mut chart = latest_chart(records, &view.genre);
    let date = chart.first().map(|r| r.latest_date);

    chart.sort_by(|a, b| {
        let ordering = compare(a, b, view.sort_column);
        match view.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let needle = view.search.trim().to_lowercase();
    let filtered: Vec<TrendRecord> = chart
        .into_iter()
        .filter(|r| matches_search(r, &needle))
        .collect();

    let mut artist_counts: HashMap<String, usize> = HashMap::new();
    for record in &filtered {
        *artist_counts
            .entry(record.artist.clone().unwrap_or_default())
            .or_default() += 1;
    }

    let page_size = view.page_size.clamp(1, MAX_PAGE_SIZE);
    let total = filtered.len();
    let pages = total.div_ceil(page_size).max(1);
    let page = view.page.clamp(1, pages);

    let rows = filtered
        .iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .map(|record| ChartRow {
            rank: record.latest_rank,
            trend: record.trend,
            trend_label: record.trend_label(),
            title: record.title.clone(),
            artist: record.artist.clone(),
            artist_count: artist_counts
                .get(record.artist.as_deref().unwrap_or(""))
                .copied()
                .unwrap_or(0),
            first_appeared: record.first_appeared,
            slug: TrackSlug::new(&record.genre, &record.title, record.artist.as_deref()).path(),
        })
        .collect();

    ChartView {
        genre: view.genre.clone(),
        genre_name: genre_display_name(&view.genre),
        date,
        total,
        page,
        pages,
        rows,
        view: ViewState {
            page,
            page_size,
            ..view.clone()
        },
    }
}
