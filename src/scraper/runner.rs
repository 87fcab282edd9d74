use super::csv_import::{csv_file_name, import_csv_file};
use crate::chart_store::ChartStore;
use crate::config::ScraperSettings;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("a scrape is already running")]
    AlreadyRunning,

    #[error("failed to start scraper {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scraper exited with {}: {stderr}", describe_exit(*.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("import failed: {0:#}")]
    Import(anyhow::Error),
}

fn describe_exit(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("code {}", code),
        None => "no exit code".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub imported: usize,
    pub rejected: usize,
    pub message: String,
}

/// Marks a scrape as in progress for as long as it is alive.
pub struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs the external scraper and imports the CSV it writes.
pub struct ScrapeRunner {
    settings: ScraperSettings,
    store: Arc<dyn ChartStore>,
    running: AtomicBool,
}

impl ScrapeRunner {
    pub fn new(settings: ScraperSettings, store: Arc<dyn ChartStore>) -> Self {
        ScrapeRunner {
            settings,
            store,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn try_begin(&self) -> Result<RunningGuard<'_>, ScrapeError> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| RunningGuard(&self.running))
            .map_err(|_| ScrapeError::AlreadyRunning)
    }

    /// Runs the scraper once and imports the file for `today`.
    pub async fn run(&self, today: NaiveDate) -> Result<ScrapeOutcome, ScrapeError> {
        let _guard = self.try_begin()?;
        let settings = &self.settings;

        info!(
            "Starting scraper: {} {}",
            settings.command,
            settings.args.join(" ")
        );
        let mut command = Command::new(&settings.command);
        command.args(&settings.args).kill_on_drop(true);
        if let Some(dir) = &settings.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|source| ScrapeError::Spawn {
            command: settings.command.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            debug!("scraper: {}", line);
        }
        for line in stderr.lines() {
            warn!("scraper: {}", line);
        }

        let exit_code = output.status.code();
        if !output.status.success() {
            error!("Scraper exited with {}", describe_exit(exit_code));
            return Err(ScrapeError::Failed {
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        let path = settings.output_dir.join(csv_file_name(today));
        let store = self.store.clone();
        let report = tokio::task::spawn_blocking(move || {
            import_csv_file(store.as_ref(), &path, Some(today))
        })
        .await
        .map_err(|e| ScrapeError::Import(e.into()))?
        .map_err(ScrapeError::Import)?;

        let message = format!(
            "Scrape completed: {} rows imported, {} rejected",
            report.imported,
            report.rejected.len()
        );
        info!("{}", message);
        Ok(ScrapeOutcome {
            success: true,
            exit_code,
            imported: report.imported,
            rejected: report.rejected.len(),
            message,
        })
    }
}
