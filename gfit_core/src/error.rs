//! Error types for the gfit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gfit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Caller supplied a value outside the accepted domain
    /// (non-positive calorie target or weight, negative duration)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown exercise name
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed persisted workout summary
    #[error("Parse error: {0}")]
    Parse(String),

    /// Event not accepted in the session's current state
    #[error("Session state error: {0}")]
    State(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
