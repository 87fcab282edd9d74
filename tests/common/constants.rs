//! Values of the seeded test chart
//!
//! The fixture holds two days of the house chart plus one techno entry:
//!
//! | title                   | artist   | 2024-03-01 | 2024-03-02 |
//! |-------------------------|----------|------------|------------|
//! | Climber                 | Ann & Bo | 3          | 1 (and 4)  |
//! | Newcomer (Extended Mix) |          |            | 2          |
//! | Steady                  | Cy       | 5          | 5          |
//! | Faller                  | Di       | 8          | 10         |
//! | Dropped                 | Ed       | 1          |            |
//!
//! Climber is listed twice on 2024-03-02, the better rank wins.

#![allow(dead_code)]

pub const HOUSE: &str = "house";
pub const TECHNO: &str = "techno";

pub const PREVIOUS_DATE: &str = "2024-03-01";
pub const LATEST_DATE: &str = "2024-03-02";

pub const CLIMBER_TITLE: &str = "Climber";
pub const CLIMBER_ARTIST: &str = "Ann & Bo";
pub const CLIMBER_TITLE_SLUG: &str = "climber";
pub const CLIMBER_ARTIST_SLUG: &str = "ann-bo";

pub const NEWCOMER_TITLE: &str = "Newcomer (Extended Mix)";
pub const NEWCOMER_TITLE_SLUG: &str = "newcomer-extended-mix";

pub const STEADY_TITLE: &str = "Steady";
pub const STEADY_ARTIST: &str = "Cy";

pub const FALLER_TITLE: &str = "Faller";
pub const FALLER_ARTIST: &str = "Di";

pub const DROPPED_TITLE: &str = "Dropped";
pub const DROPPED_ARTIST: &str = "Ed";

pub const PULSE_TITLE: &str = "Pulse";
pub const PULSE_ARTIST: &str = "Fay";

/// Rows stored by the fixture, duplicates included
pub const TOTAL_ROWS: usize = 10;

/// Distinct tracks across all genres
pub const DISTINCT_TRACKS: usize = 6;

/// Tracks on the latest house chart
pub const LATEST_HOUSE_TRACKS: usize = 4;

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
