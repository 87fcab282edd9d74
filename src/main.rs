use anyhow::{Context, Result};
use beatport_charts_server::background_jobs::DailyScrapeScheduler;
use beatport_charts_server::chart_store::{ChartStore, SqliteChartStore};
use beatport_charts_server::config::{AppConfig, CliConfig, FileConfig};
use beatport_charts_server::scraper::ScrapeRunner;
use beatport_charts_server::server::{
    cancel_on_signal, run_server, RequestsLoggingLevel, ServerConfig,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite chart database file. Created if missing.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the dashboard directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Program that scrapes the charts and writes the daily CSV.
    #[clap(long)]
    pub scraper_command: Option<String>,

    /// Local time of the daily scrape, HH:MM.
    #[clap(long)]
    pub scrape_at: Option<String>,

    /// TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let cli_config = CliConfig {
        db_path: cli_args.db_path,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
        scraper_command: cli_args.scraper_command,
        scrape_at: cli_args.scrape_at,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite chart database at {:?}...", config.db_path);
    let chart_store: Arc<dyn ChartStore> = Arc::new(SqliteChartStore::new(&config.db_path)?);
    info!(
        "{} chart rows stored, latest chart {:?}",
        chart_store.count_observations()?,
        chart_store.get_latest_date()?
    );

    let shutdown_token = CancellationToken::new();

    let scrape_runner = match config.scraper.clone() {
        Some(settings) => {
            info!("Scraper configured: {}", settings.command);
            let schedule_time = settings.schedule_time;
            let runner = Arc::new(ScrapeRunner::new(settings, chart_store.clone()));
            if let Some(at) = schedule_time {
                let scheduler =
                    DailyScrapeScheduler::new(runner.clone(), at, shutdown_token.clone());
                tokio::spawn(scheduler.run());
            }
            Some(runner)
        }
        None => {
            warn!("No scraper configured, POST /api/scrape is disabled");
            None
        }
    };

    tokio::spawn(cancel_on_signal(
        tokio::signal::ctrl_c(),
        shutdown_token.clone(),
    ));

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level,
        port: config.port,
        frontend_dir_path: config.frontend_dir_path,
    };
    run_server(server_config, chart_store, scrape_runner, shutdown_token).await
}
