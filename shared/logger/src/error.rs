//! Error types for logging operations.

use std::io;
use thiserror::Error;

/// Result type for logging operations.
pub type Result<T> = std::result::Result<T, LoggingError>;

/// Errors that can occur while setting up or parsing logging configuration.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file could not be created or opened.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A level string did not name a known level.
    #[error("Unknown log level: '{0}'")]
    UnknownLevel(String),
    /// The writer thread could not be started.
    #[error("Logging error: {0}")]
    Writer(String),
}
