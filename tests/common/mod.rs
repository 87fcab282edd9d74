//! Common test infrastructure
//!
//! Everything the end-to-end tests need to spin up a chart server backed by
//! a seeded temporary database and talk to it over HTTP.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, HOUSE};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_chart() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_chart(&[("genre", HOUSE)]).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;

#[allow(unused_imports)]
pub(crate) use fixtures::{create_empty_db, create_test_db, seeded_observations};
