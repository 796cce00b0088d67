//! Error types for the logging adapter

use std::io;
use std::path::PathBuf;

/// Result type for logging adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while initializing or rotating the log sink
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to create the log directory
    #[error("Failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The path that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// A level name that is not in the severity table
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    /// Failed to rotate the log file
    #[error("Failed to rotate log file: {0}")]
    Rotation(String),

    /// The file sink has already been closed
    #[error("Log file sink is closed")]
    Closed,
}
