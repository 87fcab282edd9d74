//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own temporary chart database.
//! When dropped, the server shuts down gracefully and the database is removed.

use super::constants::*;
use super::fixtures::{create_empty_db, create_test_db};
use beatport_charts_server::chart_store::{ChartStore, SqliteChartStore};
use beatport_charts_server::config::ScraperSettings;
use beatport_charts_server::scraper::ScrapeRunner;
use beatport_charts_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store shared with the server, for direct inspection in tests
    pub chart_store: Arc<dyn ChartStore>,

    /// Directory the scraper runs in and writes its CSV to
    pub scraper_dir: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server over the seeded test chart, without a scraper.
    pub async fn spawn() -> Self {
        let (dir, db_path) = create_test_db().expect("Failed to create test database");
        Self::spawn_with(dir, db_path, None).await
    }

    /// Spawns a server over a database with no chart rows.
    pub async fn spawn_empty() -> Self {
        let (dir, db_path) = create_empty_db().expect("Failed to create empty database");
        Self::spawn_with(dir, db_path, None).await
    }

    /// Spawns a server over the seeded test chart whose scraper is
    /// `sh -c <script>`, run inside the database's temp directory.
    pub async fn spawn_with_scraper(script: &str) -> Self {
        let (dir, db_path) = create_test_db().expect("Failed to create test database");
        Self::spawn_with(dir, db_path, Some(script)).await
    }

    async fn spawn_with(temp_db_dir: TempDir, db_path: PathBuf, script: Option<&str>) -> Self {
        let chart_store: Arc<dyn ChartStore> =
            Arc::new(SqliteChartStore::new(&db_path).expect("Failed to open chart store"));

        let scraper_dir = temp_db_dir.path().to_path_buf();
        let scrape_runner = script.map(|script| {
            let settings = ScraperSettings {
                command: "sh".to_string(),
                args: vec!["-c".to_string(), script.to_string()],
                working_dir: Some(scraper_dir.clone()),
                output_dir: scraper_dir.clone(),
                schedule_time: None,
            };
            Arc::new(ScrapeRunner::new(settings, chart_store.clone()))
        });

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            frontend_dir_path: None,
        };
        let app = make_app(config, chart_store.clone(), scrape_runner);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            chart_store,
            scraper_dir,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
