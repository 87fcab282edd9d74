//! Chart HTTP routes, mounted under `/api`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

use super::error::ApiError;
use super::state::{GuardedChartStore, OptionalScrapeRunner, ServerState};
use crate::chart::genres::{default_genre, GenreInfo, GENRES};
use crate::chart::view::{render, ChartView, SortColumn, SortDirection, Theme, ViewState};
use crate::chart::{
    compute_trends, parse_date, resolve, ChartStatus, Observation, TrackHistory, TrendRecord,
};
use crate::scraper::{ScrapeError, ScrapeOutcome};

#[derive(Debug, Deserialize, Default)]
pub struct ChartQuery {
    pub genre: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub theme: Option<String>,
}

impl ChartQuery {
    fn into_view_state(self) -> Result<ViewState, ApiError> {
        let defaults = ViewState::default();
        Ok(ViewState {
            genre: self
                .genre
                .map(|g| g.trim().to_lowercase())
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| default_genre().slug().to_string()),
            sort_column: self
                .sort
                .map(|s| s.parse::<SortColumn>())
                .transpose()?
                .unwrap_or(defaults.sort_column),
            sort_direction: self
                .dir
                .map(|s| s.parse::<SortDirection>())
                .transpose()?
                .unwrap_or(defaults.sort_direction),
            search: self.search.unwrap_or_default(),
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            theme: self
                .theme
                .map(|s| s.parse::<Theme>())
                .transpose()?
                .unwrap_or(defaults.theme),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub today: Option<String>,
}

async fn get_tracks(
    State(store): State<GuardedChartStore>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    Ok(Json(store.get_all_observations()?))
}

async fn get_track(
    State(store): State<GuardedChartStore>,
    Path((genre, title_slug, artist_slug)): Path<(String, String, String)>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    let observations = store.get_genre_observations(&genre.to_lowercase())?;
    Ok(Json(resolve(&observations, &genre, &title_slug, &artist_slug)?))
}

async fn get_track_history(
    State(store): State<GuardedChartStore>,
    Path((genre, title_slug, artist_slug)): Path<(String, String, String)>,
) -> Result<Json<TrackHistory>, ApiError> {
    let observations = store.get_genre_observations(&genre.to_lowercase())?;
    let matches = resolve(&observations, &genre, &title_slug, &artist_slug)?;
    let history = TrackHistory::from_observations(&matches)
        .ok_or_else(|| anyhow::anyhow!("Track {} resolved without observations", title_slug))?;
    Ok(Json(history))
}

async fn get_trends(
    State(store): State<GuardedChartStore>,
) -> Result<Json<Vec<TrendRecord>>, ApiError> {
    let observations = store.get_all_observations()?;
    Ok(Json(compute_trends(&observations)))
}

async fn get_chart(
    State(store): State<GuardedChartStore>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartView>, ApiError> {
    let view = query.into_view_state()?;
    let observations = store.get_genre_observations(&view.genre)?;
    let records = compute_trends(&observations);
    debug!(
        "Rendering {} chart from {} observations",
        view.genre,
        observations.len()
    );
    Ok(Json(render(&records, &view)))
}

async fn get_genres() -> Json<Vec<GenreInfo>> {
    Json(GENRES.iter().map(|g| g.info()).collect())
}

async fn get_status(
    State(store): State<GuardedChartStore>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ChartStatus>, ApiError> {
    let today: NaiveDate = match query.today {
        Some(today) => parse_date(&today)?,
        None => Local::now().date_naive(),
    };
    let latest = store.get_latest_date()?;
    let total = store.count_observations()?;
    Ok(Json(ChartStatus::new(latest, total, today)))
}

fn failed_outcome(exit_code: Option<i32>, message: String) -> Response {
    let outcome = ScrapeOutcome {
        success: false,
        exit_code,
        imported: 0,
        rejected: 0,
        message,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(outcome)).into_response()
}

async fn post_scrape(State(runner): State<OptionalScrapeRunner>) -> Result<Response, ApiError> {
    let runner = runner.ok_or(ApiError::ScraperUnavailable)?;
    info!("Scrape requested over HTTP");
    match runner.run(Local::now().date_naive()).await {
        Ok(outcome) => Ok(Json(outcome).into_response()),
        Err(ScrapeError::AlreadyRunning) => Err(ApiError::ScrapeInProgress),
        Err(err) => {
            let exit_code = match &err {
                ScrapeError::Failed { exit_code, .. } => *exit_code,
                _ => None,
            };
            Ok(failed_outcome(exit_code, err.to_string()))
        }
    }
}

pub fn chart_routes() -> Router<ServerState> {
    Router::new()
        .route("/tracks", get(get_tracks))
        .route("/tracks/{genre}/{title_slug}/{artist_slug}", get(get_track))
        .route(
            "/tracks/{genre}/{title_slug}/{artist_slug}/history",
            get(get_track_history),
        )
        .route("/trends", get(get_trends))
        .route("/chart", get(get_chart))
        .route("/genres", get(get_genres))
        .route("/status", get(get_status))
        .route("/scrape", post(post_scrape))
}
