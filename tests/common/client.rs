//! HTTP client for the chart API

use super::constants::*;
use reqwest::{Client, Response};
use std::time::Duration;

pub struct TestClient {
    client: Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {} failed: {}", path, e))
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    /// GET /api/tracks
    pub async fn get_tracks(&self) -> Response {
        self.get("/api/tracks").await
    }

    /// GET /api/tracks/{genre}/{title}/{artist}
    pub async fn get_track(&self, genre: &str, title: &str, artist: &str) -> Response {
        self.get(&format!(
            "/api/tracks/{}/{}/{}",
            urlencoding::encode(genre),
            urlencoding::encode(title),
            urlencoding::encode(artist)
        ))
        .await
    }

    /// GET /api/tracks/{genre}/{title}/{artist}/history
    pub async fn get_history(&self, genre: &str, title: &str, artist: &str) -> Response {
        self.get(&format!(
            "/api/tracks/{}/{}/{}/history",
            urlencoding::encode(genre),
            urlencoding::encode(title),
            urlencoding::encode(artist)
        ))
        .await
    }

    /// GET /api/trends
    pub async fn get_trends(&self) -> Response {
        self.get("/api/trends").await
    }

    /// GET /api/chart with the given query parameters
    pub async fn get_chart(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/chart", self.base_url))
            .query(query)
            .send()
            .await
            .expect("Chart request failed")
    }

    /// GET /api/genres
    pub async fn get_genres(&self) -> Response {
        self.get("/api/genres").await
    }

    /// GET /api/status, optionally relative to a given day
    pub async fn get_status(&self, today: Option<&str>) -> Response {
        match today {
            Some(today) => {
                self.get(&format!("/api/status?today={}", urlencoding::encode(today)))
                    .await
            }
            None => self.get("/api/status").await,
        }
    }

    /// POST /api/scrape
    pub async fn post_scrape(&self) -> Response {
        self.client
            .post(format!("{}/api/scrape", self.base_url))
            .send()
            .await
            .expect("Scrape request failed")
    }
}
