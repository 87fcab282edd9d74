//! Schema of the chart database.
//!
//! Version 0 is the table the scraper pipeline has always written to.
//! Version 1 records when each row was scraped.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::Result;
use rusqlite::Connection;

pub const CHART_TABLE_NAME: &str = "beatport_top100";

const CHART_TABLE_V0: Table = Table {
    name: CHART_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text),
        sqlite_column!("rank", &SqlType::Integer, non_null = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_top100_date", "date"),
        ("idx_top100_genre", "genre"),
    ],
};

const CHART_TABLE_V1: Table = Table {
    name: CHART_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text),
        sqlite_column!("rank", &SqlType::Integer, non_null = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!("scraped_at", &SqlType::Integer),
    ],
    indices: &[
        ("idx_top100_date", "date"),
        ("idx_top100_genre", "genre"),
    ],
};

fn add_scraped_at(conn: &Connection) -> Result<()> {
    conn.execute(
        "ALTER TABLE beatport_top100 ADD COLUMN scraped_at INTEGER",
        [],
    )?;
    Ok(())
}

pub const CHART_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[CHART_TABLE_V0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[CHART_TABLE_V1],
        migration: Some(add_scraped_at),
    },
];
