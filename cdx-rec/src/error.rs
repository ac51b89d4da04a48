//! Error types for cdx-rec
//!
//! Defines engine-specific error types using thiserror for clear error
//! propagation. Parse and injected failures are explicit variants so callers
//! can never mistake them for a valid empty result set.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the recommendation engine
#[derive(Error, Debug)]
pub enum Error {
    /// Interpreter could not produce even an unconstrained intent.
    /// Effectively unreachable given the unconstrained fallback, but defined
    /// for malformed/non-text input.
    #[error("Query interpretation failed: {0}")]
    ParseFailure(String),

    /// Deliberate, simulated downstream failure (fault injection path)
    #[error("Injected failure for request {request_id}")]
    InjectedFailure { request_id: Uuid },

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<cdx_common::Error> for Error {
    fn from(err: cdx_common::Error) -> Self {
        match err {
            cdx_common::Error::Io(io) => Error::Io(io),
            cdx_common::Error::Config(msg) => Error::Config(msg),
            other => Error::Internal(other.to_string()),
        }
    }
}

impl Error {
    /// The request this error belongs to, when one was assigned
    pub fn request_id(&self) -> Option<Uuid> {
        match self {
            Error::InjectedFailure { request_id } => Some(*request_id),
            _ => None,
        }
    }
}

/// Convenience Result type using cdx-rec Error
pub type Result<T> = std::result::Result<T, Error>;
