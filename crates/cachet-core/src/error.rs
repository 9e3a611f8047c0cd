//! Domain-level error types.

use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong between a caller and the backing store.
///
/// Absence of a key is not in here: it is reported as [`crate::Outcome::NotFound`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Missing or invalid setup. Fatal at construction.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Backend unreachable or liveness probe failed. Fatal at construction.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Caller-correctable input problem, such as an empty key.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other backend or transport failure during an operation.
    #[error("Backend failure: {0}")]
    Backend(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Repository is closed")]
    Closed,
}
