use serde::{Deserialize, Serialize};
use vision::{EngineConfig, OpenRequest, Result};

/// Capture device and engine timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub device_index: i32,
    /// 0 keeps the driver's native resolution
    pub width: i32,
    pub height: i32,
    pub idle_poll_ms: u64,
    pub no_frame_retry_ms: u64,
    /// Notifications buffered between the capture thread and the consumer
    pub event_queue_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            device_index: 0,
            width: 640,
            height: 480,
            idle_poll_ms: 50,
            no_frame_retry_ms: 1,
            event_queue_capacity: 64,
        }
    }
}

impl CaptureConfig {
    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::from_millis(self.idle_poll_ms, self.no_frame_retry_ms)
    }

    pub fn open_request(&self) -> Result<OpenRequest> {
        OpenRequest::new(self.device_index)?.with_resolution(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_build_valid_requests() {
        let config = CaptureConfig::default();
        let request = config.open_request().unwrap();
        assert_eq!(request.resolution(), Some((640, 480)));

        let engine = config.engine_config().unwrap();
        assert_eq!(engine.idle_poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = CaptureConfig {
            device_index: -2,
            ..CaptureConfig::default()
        };
        assert!(config.open_request().is_err());

        let config = CaptureConfig {
            idle_poll_ms: 60_000,
            ..CaptureConfig::default()
        };
        assert!(config.engine_config().is_err());
    }
}
