//! Beatport Top-100 chart server library.
//!
//! Exposes the internal modules for the binaries and the end-to-end tests.

pub mod background_jobs;
pub mod chart;
pub mod chart_store;
pub mod config;
pub mod scraper;
pub mod server;
pub mod sqlite_persistence;

pub use chart_store::{ChartStore, SqliteChartStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
