//! Error types for tick-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for tick-server
#[derive(Error, Debug)]
pub enum Error {
    /// The task spawner could not accept a new emission task
    #[error("Scheduling failed: {0}")]
    Scheduling(String),

    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// File or socket I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// tick-common error
    #[error("Common error: {0}")]
    Common(#[from] tick_common::Error),
}

/// Convenience Result type using tick-server Error
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            Error::Scheduling(_) => (StatusCode::SERVICE_UNAVAILABLE, "SCHEDULING_FAILED"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Error::Http(_) => (StatusCode::INTERNAL_SERVER_ERROR, "HTTP_ERROR"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            Error::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
