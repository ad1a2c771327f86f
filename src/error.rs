use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::fetcher::FetchError;
use crate::services::normalizer::NormalizeError;

/// Errors surfaced by the playlist endpoint
#[derive(Debug, Error)]
pub enum AppError {
    /// Query string could not be decoded (e.g. a repeated parameter)
    #[error("Invalid query string")]
    InvalidQuery(String),

    /// `service` query parameter missing or blank
    #[error("No service type provided")]
    MissingService,

    /// `start_chno` is not a non-negative integer
    #[error("Invalid start_chno {0}")]
    InvalidStartChno(String),

    /// Region not present in a regioned feed
    #[error("Invalid region {0}")]
    InvalidRegion(String),

    /// Feed has neither `channels` nor `regions`
    #[error("Invalid data format")]
    InvalidDataFormat,

    /// Service feed could not be fetched or parsed
    #[error("Failed to fetch data")]
    Upstream(#[source] FetchError),

    /// Plex channel catalog could not be fetched or parsed
    #[error("Failed to fetch Plex channels")]
    PlexCatalog(#[source] FetchError),

    /// Path other than `/` in strict mode
    #[error("Not Found")]
    NotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidQuery(_)
            | AppError::MissingService
            | AppError::InvalidStartChno(_)
            | AppError::InvalidRegion(_)
            | AppError::InvalidDataFormat => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::PlexCatalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Short label used for the `outcome` metric dimension
    pub fn outcome(&self) -> &'static str {
        match self {
            AppError::InvalidQuery(_)
            | AppError::MissingService
            | AppError::InvalidStartChno(_) => "bad_request",
            AppError::InvalidRegion(_) => "invalid_region",
            AppError::InvalidDataFormat => "invalid_data",
            AppError::Upstream(_) | AppError::PlexCatalog(_) => "upstream_error",
            AppError::NotFound => "not_found",
        }
    }
}

impl From<NormalizeError> for AppError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::InvalidRegion(region) => AppError::InvalidRegion(region),
            NormalizeError::InvalidDataFormat => AppError::InvalidDataFormat,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Upstream(e) | AppError::PlexCatalog(e) => {
                tracing::error!("{}: {}", self, e);
            }
            AppError::InvalidQuery(detail) => {
                tracing::warn!("Rejected playlist request: {}", detail);
            }
            AppError::NotFound => {}
            _ => tracing::warn!("Rejected playlist request: {}", self),
        }

        let body = if matches!(self, AppError::NotFound) {
            self.to_string()
        } else {
            format!("Error: {}", self)
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

/// Convenience alias for handler results
pub type AppResult<T> = Result<T, AppError>;
