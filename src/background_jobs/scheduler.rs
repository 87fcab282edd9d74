use crate::scraper::{ScrapeError, ScrapeRunner};
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// First moment strictly after `now` whose time of day is `at`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        let tomorrow = now
            .date()
            .checked_add_days(Days::new(1))
            .unwrap_or(now.date());
        tomorrow.and_time(at)
    }
}

/// Triggers the scraper once a day at a fixed local time.
pub struct DailyScrapeScheduler {
    runner: Arc<ScrapeRunner>,
    at: NaiveTime,
    shutdown_token: CancellationToken,
}

impl DailyScrapeScheduler {
    pub fn new(runner: Arc<ScrapeRunner>, at: NaiveTime, shutdown_token: CancellationToken) -> Self {
        Self {
            runner,
            at,
            shutdown_token,
        }
    }

    fn time_until_next_run(&self) -> (NaiveDateTime, Duration) {
        let now = Local::now().naive_local();
        let next = next_run_after(now, self.at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        (next, wait)
    }

    async fn run_once(&self) {
        let today = Local::now().date_naive();
        match self.runner.run(today).await {
            Ok(outcome) => info!("Scheduled scrape finished: {}", outcome.message),
            Err(ScrapeError::AlreadyRunning) => {
                info!("Skipping scheduled scrape, one is already running")
            }
            Err(e) => error!("Scheduled scrape failed: {}", e),
        }
    }

    /// Main scheduler loop, returns once the shutdown token is cancelled.
    pub async fn run(self) {
        info!("Starting daily scrape scheduler, runs at {}", self.at);
        loop {
            let (next, wait) = self.time_until_next_run();
            debug!("Next scheduled scrape at {} (in {:?})", next, wait);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.run_once().await;
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Scrape scheduler received shutdown signal");
                    break;
                }
            }
        }
        info!("Scrape scheduler stopped");
    }
}
