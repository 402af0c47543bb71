//! Error types for the annotation engine.

use thiserror::Error;

/// Result type alias using the annotation engine's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for annotation operations.
///
/// `NotFound` and `Conflict` are expected control-flow outcomes and are
/// returned to the caller without being logged as failures. `Database`
/// and `Internal` indicate unexpected storage problems; the enclosing
/// transaction is rolled back in full before they surface.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation targets a (data source, id) with no live row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create targets a (data source, id) that already has a live row
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is an expected, non-retriable outcome rather
    /// than a storage failure.
    pub fn is_expected(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Conflict(_))
    }
}
