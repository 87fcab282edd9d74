use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::chart_routes::chart_routes;
use super::state::{GuardedChartStore, OptionalScrapeRunner, ServerState};
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub scraper_configured: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        scraper_configured: state.scrape_runner.is_some(),
    };
    Json(stats)
}

pub fn make_app(
    config: ServerConfig,
    chart_store: GuardedChartStore,
    scrape_runner: OptionalScrapeRunner,
) -> Router {
    let state = ServerState::new(config.clone(), chart_store, scrape_runner);

    let api_routes: Router = chart_routes().with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)).with_state(state.clone()),
    };

    home_router
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// Cancels `shutdown` once `signal` fires. A signal that cannot be listened
/// for leaves the token alone.
pub async fn cancel_on_signal<F>(signal: F, shutdown: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Received Ctrl-C, shutting down...");
            shutdown.cancel();
        }
        Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
    }
}

/// Serves until `shutdown` is cancelled.
pub async fn run_server(
    config: ServerConfig,
    chart_store: GuardedChartStore,
    scrape_runner: OptionalScrapeRunner,
    shutdown: CancellationToken,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, chart_store, scrape_runner);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Observation, parse_date};
    use crate::chart_store::{ChartStore, SqliteChartStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn obs(genre: &str, title: &str, artist: &str, rank: u32, date: &str) -> Observation {
        Observation {
            genre: genre.to_string(),
            title: title.to_string(),
            artist: Some(artist.to_string()),
            rank,
            date: parse_date(date).unwrap(),
            scraped_at: None,
        }
    }

    fn seeded_app() -> Router {
        let store = SqliteChartStore::in_memory().unwrap();
        store
            .insert_observations(&[
                obs("house", "Rise", "Ann", 3, "2024-06-01"),
                obs("house", "Rise", "Ann", 1, "2024-06-02"),
                obs("house", "New One", "Bo", 2, "2024-06-02"),
                obs("techno", "Dark", "Cy", 1, "2024-06-01"),
            ])
            .unwrap();
        make_app(ServerConfig::default(), Arc::new(store), None)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn signal_cancels_shutdown_token() {
        let token = CancellationToken::new();
        cancel_on_signal(async { Ok(()) }, token.clone()).await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_serving() {
        let token = CancellationToken::new();
        let signal = async { Err(std::io::Error::other("no signal handler")) };
        cancel_on_signal(signal, token.clone()).await;
        assert!(!token.is_cancelled());
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn home_reports_stats() {
        let (status, json) = get_json(seeded_app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scraper_configured"], false);
        assert!(json["uptime"].is_string());
    }

    #[tokio::test]
    async fn lists_tracks_newest_first() {
        let (status, json) = get_json(seeded_app(), "/api/tracks").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["date"], "2024-06-02");
        assert_eq!(rows[0]["title"], "Rise");
        assert_eq!(rows[3]["genre"], "techno");
    }

    #[tokio::test]
    async fn chart_computes_trends() {
        let (status, json) = get_json(seeded_app(), "/api/chart?genre=house").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2024-06-02");
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows[0]["title"], "Rise");
        assert_eq!(rows[0]["trend"], 2);
        assert_eq!(rows[0]["trendLabel"], "↑ +2");
        assert_eq!(rows[1]["trend"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn chart_rejects_unknown_sort() {
        let (status, json) = get_json(seeded_app(), "/api/chart?genre=house&sort=bpm").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("bpm"));
    }

    #[tokio::test]
    async fn track_lookup_and_history() {
        let (status, json) = get_json(seeded_app(), "/api/tracks/house/rise/ann").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);

        let (status, json) = get_json(seeded_app(), "/api/tracks/house/rise/ann/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["peakRank"], 1);
        assert_eq!(json["firstAppeared"], "2024-06-01");

        let (status, json) = get_json(seeded_app(), "/api/tracks/house/fall/ann").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn status_is_relative_to_given_day() {
        let (_, json) = get_json(seeded_app(), "/api/status?today=2024-06-03").await;
        assert_eq!(json["staleness"], "yesterday");
        assert_eq!(json["totalRows"], 4);

        let (status, _) = get_json(seeded_app(), "/api/status?today=tomorrow").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scrape_without_scraper_is_unavailable() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/scrape")
            .body(Body::empty())
            .unwrap();
        let response = seeded_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn lists_genres() {
        let (_, json) = get_json(seeded_app(), "/api/genres").await;
        let genres = json.as_array().unwrap();
        assert_eq!(genres.len(), 35);
        assert!(genres.iter().any(|g| g["slug"] == "house" && g["name"] == "House"));
    }
}
