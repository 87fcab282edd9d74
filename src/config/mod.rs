mod file_config;

pub use file_config::{FileConfig, ScraperConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveTime;
use clap::ValueEnum;
use std::path::PathBuf;

pub const SCHEDULE_TIME_FORMAT: &str = "%H:%M";

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub scraper_command: Option<String>,
    pub scrape_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    /// None when no scraper command is configured or it is disabled.
    pub scraper: Option<ScraperSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperSettings {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// None disables the daily run; manual triggers still work.
    pub schedule_time: Option<NaiveTime>,
}

pub fn parse_schedule_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), SCHEDULE_TIME_FORMAT)
        .with_context(|| format!("Invalid schedule time {:?}, expected HH:MM", value))
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow!("db_path must be specified via --db-path or in config file"))?;

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(level) => parse_logging_level(&level)
                .ok_or_else(|| anyhow!("Invalid logging_level {:?}", level))?,
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let scraper = resolve_scraper(cli, file.scraper.unwrap_or_default())?;

        Ok(Self {
            db_path,
            port,
            logging_level,
            frontend_dir_path,
            scraper,
        })
    }
}

fn resolve_scraper(cli: &CliConfig, file: ScraperConfig) -> Result<Option<ScraperSettings>> {
    if !file.enabled.unwrap_or(true) {
        return Ok(None);
    }
    let command = match file.command.or_else(|| cli.scraper_command.clone()) {
        Some(command) if !command.trim().is_empty() => command,
        _ => return Ok(None),
    };

    let working_dir = file.working_dir.map(PathBuf::from);
    let output_dir = file
        .output_dir
        .map(PathBuf::from)
        .or_else(|| working_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let schedule_time = file
        .schedule_time
        .or_else(|| cli.scrape_at.clone())
        .map(|s| parse_schedule_time(&s))
        .transpose()?;

    Ok(Some(ScraperSettings {
        command,
        args: file.args.unwrap_or_default(),
        working_dir,
        output_dir,
        schedule_time,
    }))
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
