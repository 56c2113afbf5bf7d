//! Error types for seed dumping.

use thiserror::Error;

/// The main error type for dump operations.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The options cannot be honoured (raised before any I/O happens).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to parse option text such as the import trailer.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Input records could not be read.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Database error while counting or paging.
    #[error("Database error: {0}")]
    Database(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DumpError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for dump operations.
pub type DumpResult<T> = Result<T, DumpError>;
