//! Error types for the telemetry service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for telemetry, weather and configuration operations
#[derive(Debug, Error)]
pub enum Error {
    /// Not enough stored readings to run an analysis
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The telemetry store holds no readings
    #[error("No telemetry readings available")]
    NoReadings,

    /// Planet key not present in the catalog
    #[error("No data available for {0}")]
    UnknownPlanet(String),

    /// Upstream weather service returned something unusable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map the error to an HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InsufficientData(_) => StatusCode::BAD_REQUEST,
            Error::NoReadings | Error::UnknownPlanet(_) => StatusCode::NOT_FOUND,
            Error::Upstream(_) | Error::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn short_message(&self) -> &'static str {
        match self {
            Error::InsufficientData(_) => "Insufficient data for analysis",
            Error::NoReadings => "No telemetry readings",
            Error::UnknownPlanet(_) => "Unknown planet",
            Error::Upstream(_) | Error::Network(_) => "Upstream weather service failed",
            Error::Config(_) | Error::InvalidConfiguration(_) => "Configuration error",
            _ => "Internal error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.short_message(),
            "details": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::InsufficientData("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::NoReadings.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::UnknownPlanet("pluto".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Upstream("bad".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::InvalidConfiguration("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::UnknownPlanet("pluto".to_string());
        assert_eq!(err.to_string(), "No data available for pluto");
    }
}
