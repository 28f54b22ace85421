//! Controller configuration

pub mod app_config;
pub mod calibration_config;
pub mod capture_config;
pub mod logging_config;

pub use app_config::ControllerConfig;
pub use calibration_config::CalibrationConfig;
pub use capture_config::CaptureConfig;
pub use logging_config::LoggingConfig;
