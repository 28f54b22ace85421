//! Error types for capture and calibration operations.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionError>;

/// Error type for the vision library
#[derive(Debug, Error)]
pub enum VisionError {
    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// OpenCV error
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
    /// Capture device error (driver message kept verbatim)
    #[error("Device error: {0}")]
    Device(String),
    /// Operation requires an open device
    #[error("No capture device is open")]
    DeviceNotOpen,
    /// Malformed lifecycle or property request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Calibration pipeline error
    #[error("Calibration error: {0}")]
    Calibration(String),
    /// Too few accepted samples for the solver
    #[error("Insufficient samples: found {found}, at least {required} required")]
    InsufficientSamples { found: usize, required: usize },
    /// Calibration artifacts could not be written or decoded
    #[error("Persistence error: {0}")]
    Persistence(String),
    /// JSON encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Capture engine thread error
    #[error("Engine error: {0}")]
    Engine(String),
}
