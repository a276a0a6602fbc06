//! Error types for pointslab

use thiserror::Error;

/// Main error type for pointslab operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Attribute sequences disagree in length, or a declared attribute is missing
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A primitive code no vertex layout knows about
    #[error("Unknown primitive kind: {0}")]
    UnknownPrimitive(u8),

    /// The buffer backend could not allocate storage
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The buffer backend was asked for something it cannot do
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("GPU error: {0}")]
    Gpu(String),
}

/// Result type alias for pointslab operations
pub type Result<T> = std::result::Result<T, Error>;

