use logging::{LogLevel, LogTarget};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file_path: String,
    pub log_level: String,
    pub enable_console: bool,
    pub enable_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_file_path: "arm-controller.log".to_string(),
            log_level: "info".to_string(),
            enable_console: true,
            enable_file: true,
        }
    }
}

impl LoggingConfig {
    /// Configured level, `Info` when the string is not a level name
    pub fn level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or(LogLevel::Info)
    }

    pub fn target(&self) -> LogTarget {
        let path = PathBuf::from(&self.log_file_path);
        match (self.enable_file, self.enable_console) {
            (true, true) => LogTarget::FileAndConsole(path),
            (true, false) => LogTarget::File(path),
            (false, true) => LogTarget::Console,
            (false, false) => LogTarget::Discard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_follows_flags() {
        let mut config = LoggingConfig::default();
        assert_eq!(
            config.target(),
            LogTarget::FileAndConsole(PathBuf::from("arm-controller.log"))
        );

        config.enable_console = false;
        assert_eq!(config.target(), LogTarget::File(PathBuf::from("arm-controller.log")));

        config.enable_file = false;
        assert_eq!(config.target(), LogTarget::Discard);
    }

    #[test]
    fn test_unknown_level_defaults_to_info() {
        let config = LoggingConfig {
            log_level: "verbose".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(config.level(), LogLevel::Info);

        let config = LoggingConfig {
            log_level: "DEBUG".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(config.level(), LogLevel::Debug);
    }
}
