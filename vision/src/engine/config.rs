//! Capture loop configuration.

use crate::common::constants::timing::{IDLE_POLL_INTERVAL, NO_FRAME_RETRY_INTERVAL};
use crate::error::{Result, VisionError};
use std::time::Duration;

/// Timing and naming of the capture thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Sleep between iterations while no device is open
    pub idle_poll_interval: Duration,
    /// Sleep after a read that produced no frame
    pub no_frame_retry_interval: Duration,
    /// Name of the capture thread (shows up in logs)
    pub thread_name: String,
}

impl EngineConfig {
    /// Longest accepted polling interval
    const MAX_INTERVAL: Duration = Duration::from_secs(10);

    pub fn new(idle_poll_interval: Duration, no_frame_retry_interval: Duration) -> Result<Self> {
        for (name, interval) in [
            ("Idle poll interval", idle_poll_interval),
            ("No-frame retry interval", no_frame_retry_interval),
        ] {
            if interval > Self::MAX_INTERVAL {
                return Err(VisionError::Config(format!(
                    "{} must be at most {:?}, got {:?}",
                    name,
                    Self::MAX_INTERVAL,
                    interval
                )));
            }
        }

        Ok(EngineConfig {
            idle_poll_interval,
            no_frame_retry_interval,
            ..Self::default()
        })
    }

    /// Millisecond form used by configuration files
    pub fn from_millis(idle_poll_ms: u64, no_frame_retry_ms: u64) -> Result<Self> {
        Self::new(
            Duration::from_millis(idle_poll_ms),
            Duration::from_millis(no_frame_retry_ms),
        )
    }

    pub fn with_thread_name(mut self, name: &str) -> Result<Self> {
        if name.trim().is_empty() || name.contains('\0') {
            return Err(VisionError::Config(
                "Thread name must be non-empty and contain no NUL bytes".to_string(),
            ));
        }
        self.thread_name = name.to_string();
        Ok(self)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            idle_poll_interval: IDLE_POLL_INTERVAL,
            no_frame_retry_interval: NO_FRAME_RETRY_INTERVAL,
            thread_name: "capture".to_string(),
        }
    }
}
