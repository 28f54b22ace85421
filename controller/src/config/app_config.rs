use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{CalibrationConfig, CaptureConfig, LoggingConfig};

/// Default configuration file name searched by [`ControllerConfig::locate`]
pub const CONFIG_FILE_NAME: &str = "controller_config.json";

/// Arm controller configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub logging: LoggingConfig,
    pub capture: CaptureConfig,
    pub calibration: CalibrationConfig,
}

impl ControllerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> config_loader::Result<Self> {
        config_loader::load_json(path)
    }

    /// Searches the usual locations for [`CONFIG_FILE_NAME`]
    pub fn locate() -> config_loader::Result<Self> {
        config_loader::find_and_load_json(CONFIG_FILE_NAME)
    }
}
