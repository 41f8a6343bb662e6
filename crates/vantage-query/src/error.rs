//! Error types for cross-engine loads.

use thiserror::Error;

/// Failures a load operation can report.
///
/// Nothing in here retries or recovers. Every failure is surfaced to the
/// caller as data; transport concerns live behind the execution channel.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Engine-reported query failure, passed through verbatim.
    #[error("{0}")]
    Engine(String),

    /// Engine tag this loader has no strategy for.
    #[error("Unsupported engine type: {0}")]
    UnsupportedEngine(String),

    /// Binding columns and values cannot express a valid restriction.
    #[error("Malformed binding: {0}")]
    MalformedBinding(String),

    /// Count response did not carry a usable non-negative integer.
    #[error("Malformed count response: {0}")]
    MalformedCount(String),
}

impl LoadError {
    pub fn engine(message: impl Into<String>) -> Self {
        LoadError::Engine(message.into())
    }

    pub fn malformed_binding(message: impl Into<String>) -> Self {
        LoadError::MalformedBinding(message.into())
    }

    pub fn malformed_count(message: impl Into<String>) -> Self {
        LoadError::MalformedCount(message.into())
    }
}

/// Result type alias for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
