use axum::extract::FromRef;

use crate::chart_store::ChartStore;
use crate::scraper::ScrapeRunner;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedChartStore = Arc<dyn ChartStore>;
pub type OptionalScrapeRunner = Option<Arc<ScrapeRunner>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub chart_store: GuardedChartStore,
    pub scrape_runner: OptionalScrapeRunner,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        chart_store: GuardedChartStore,
        scrape_runner: OptionalScrapeRunner,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            chart_store,
            scrape_runner,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedChartStore {
    fn from_ref(input: &ServerState) -> Self {
        input.chart_store.clone()
    }
}

impl FromRef<ServerState> for OptionalScrapeRunner {
    fn from_ref(input: &ServerState) -> Self {
        input.scrape_runner.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
