use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while locating, reading or decoding a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// The file exists but could not be read.
    #[error("Error reading configuration file: {0}")]
    ReadError(String),

    /// The file was read but its contents do not match the expected shape.
    #[error("Invalid configuration in {path}: {message}")]
    Parse { path: String, message: String },
}
