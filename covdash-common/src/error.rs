//! Common error types for covdash

use thiserror::Error;

/// Common result type for covdash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the dashboard crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or row decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Network-level failure talking to the statistics API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Statistics API answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input to a computation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
