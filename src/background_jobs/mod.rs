//! Background work running alongside the HTTP server.
//!
//! Currently the only job is the once-a-day scrape.

mod scheduler;

pub use scheduler::{next_run_after, DailyScrapeScheduler};
