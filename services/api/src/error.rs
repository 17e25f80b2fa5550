//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service, plus the small helpers
//! the HTTP handlers use to turn failures into status codes.

use crate::config::ConfigError;
use axum::http::StatusCode;
use carefinder_core::ports::PortError;
use std::fmt::Debug;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the embedded migrations.
    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error half of every handler's return type.
pub type HandlerError = (StatusCode, String);

/// A 400 naming the offending field.
pub fn bad_request(message: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, message.into())
}

/// Logs the cause and returns a generic 500. The cause never reaches the client.
pub fn internal_error(public_message: &str, cause: impl Debug) -> HandlerError {
    error!("{}: {:?}", public_message, cause);
    (StatusCode::INTERNAL_SERVER_ERROR, public_message.to_string())
}
