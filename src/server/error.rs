use crate::chart::view::ViewError;
use crate::chart::{LookupError, ObservationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures of the chart API, each mapped to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error(transparent)]
    NotFound(#[from] LookupError),

    #[error("{0}")]
    BadRequest(String),

    #[error("no scraper is configured")]
    ScraperUnavailable,

    #[error("a scrape is already running")]
    ScrapeInProgress,
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ObservationError> for ApiError {
    fn from(err: ObservationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ScraperUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ScrapeInProgress => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:#}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
