//! Error types for the Rocchio expansion library.
//!
//! All errors are represented by the [`RocchioError`] enum. Collaborator
//! failures (search backend, term-vector store, transport timeouts) are
//! folded into [`RocchioError::BackendUnavailable`] so that hosts only need
//! to distinguish a handful of cases.
//!
//! # Examples
//!
//! ```
//! use rocchio::error::{Result, RocchioError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(RocchioError::invalid_config("k1 must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for expansion operations.
#[derive(Error, Debug)]
pub enum RocchioError {
    /// A term was looked up in corpus statistics before it was observed.
    #[error("Statistic unavailable: {0}")]
    StatisticUnavailable(String),

    /// The search or term-statistics collaborator could not be reached,
    /// timed out, or answered with something unusable.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The feedback query matched no documents.
    #[error("No results: {0}")]
    NoResults(String),

    /// Malformed expansion parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// I/O errors (corpus files, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with RocchioError.
pub type Result<T> = std::result::Result<T, RocchioError>;

impl RocchioError {
    /// Create a new statistic-unavailable error for `term`.
    pub fn statistic_unavailable<S: Into<String>>(term: S) -> Self {
        RocchioError::StatisticUnavailable(term.into())
    }

    /// Create a new backend-unavailable error.
    pub fn backend_unavailable<S: Into<String>>(msg: S) -> Self {
        RocchioError::BackendUnavailable(msg.into())
    }

    /// Create a new no-results error.
    pub fn no_results<S: Into<String>>(msg: S) -> Self {
        RocchioError::NoResults(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        RocchioError::InvalidConfig(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        RocchioError::Analysis(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RocchioError::Other(msg.into())
    }

    /// Create a new timeout error. Timeouts surface as an unavailable backend.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        RocchioError::BackendUnavailable(format!("Timeout: {}", msg.into()))
    }

    /// Whether this error came from a collaborator rather than from the caller.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, RocchioError::BackendUnavailable(_))
    }
}

impl From<reqwest::Error> for RocchioError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RocchioError::timeout(err.to_string())
        } else {
            RocchioError::BackendUnavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = RocchioError::invalid_config("b must be within [0, 1]");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: b must be within [0, 1]"
        );

        let error = RocchioError::statistic_unavailable("cat");
        assert_eq!(error.to_string(), "Statistic unavailable: cat");

        let error = RocchioError::backend_unavailable("connection refused");
        assert_eq!(error.to_string(), "Backend unavailable: connection refused");
    }

    #[test]
    fn test_timeout_is_backend_error() {
        let error = RocchioError::timeout("search after 50ms");
        assert!(error.is_backend_error());
        assert_eq!(
            error.to_string(),
            "Backend unavailable: Timeout: search after 50ms"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = RocchioError::from(io_error);

        match error {
            RocchioError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
