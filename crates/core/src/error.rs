//! Error types for the event panel pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the event panel pipeline.
///
/// Arithmetic edge cases (zero legs, non-finite prices) are deliberately
/// absent: they travel as data, see [`crate::DataQuality`].
#[derive(Error, Debug)]
pub enum Error {
    /// Remote call failed or returned a malformed shape.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Expected field absent or of the wrong shape.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Malformed time text.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Whether the error ends the current fetch job.
    pub fn is_fetch_fatal(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Schema(_))
    }
}
