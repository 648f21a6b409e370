use std::time::Duration;

use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use resilience::Retryable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid postcode: {0:?}")]
    InvalidPostcode(String),

    /// The service does not know the postcode. Terminal.
    #[error("No location found for postcode {0}")]
    NotFound(String),

    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Geocoding request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Geocoding service responded with status {0}")]
    Upstream(u16),

    #[error("Undecodable geocoding response: {0}")]
    Decode(String),

    #[error("Geocoding failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<GeoError> },
}

impl Retryable for GeoError {
    fn is_transient(&self) -> bool {
        match self {
            GeoError::Transport(_) | GeoError::Timeout(_) | GeoError::Decode(_) => true,
            GeoError::Upstream(status) => *status >= 500 || *status == 429,
            GeoError::InvalidPostcode(_) | GeoError::NotFound(_) | GeoError::Exhausted { .. } => {
                false
            }
        }
    }
}

impl From<GeoError> for AppError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::InvalidPostcode(postcode) => {
                AppError::BadRequest(format!("Invalid postcode: {postcode:?}"))
            }
            GeoError::NotFound(postcode) => {
                AppError::NotFound(format!("No location found for postcode {postcode}"))
            }
            other => AppError::ExternalService(other.to_string()),
        }
    }
}

impl IntoResponse for GeoError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
