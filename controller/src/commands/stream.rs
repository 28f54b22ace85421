//! Headless streaming

use logging::Logger;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};
use vision::calibration::write_frame;
use vision::common::constants::logging::CAMERA_LOG_INTERVAL;
use vision::{CalibrationStore, CaptureEngine, CaptureEvent, OpenRequest, PropertyId, VideoFrame};

use super::CommandResult;
use crate::cli::StreamArgs;
use crate::config::ControllerConfig;

/// What happened during one streaming session
#[derive(Debug, Default)]
pub struct StreamStats {
    pub frames: u64,
    pub opened: bool,
    pub rejected: u64,
    pub failure: Option<String>,
    pub last_frame: Option<VideoFrame>,
}

impl StreamStats {
    /// Updates counters from one notification and logs it
    pub fn record(&mut self, event: CaptureEvent, keep_last: bool, logger: &Logger) {
        match event {
            CaptureEvent::Frame(frame) => {
                self.frames += 1;
                if self.frames.is_multiple_of(CAMERA_LOG_INTERVAL) {
                    logger.info(&format!("Received {} frames", self.frames));
                }
                if keep_last {
                    self.last_frame = Some(frame);
                }
            }
            CaptureEvent::DeviceOpened {
                device_index,
                width,
                height,
            } => {
                self.opened = true;
                self.failure = None;
                logger.info(&format!("Camera {} opened at {}x{}", device_index, width, height));
            }
            CaptureEvent::PropertiesSupported {
                device_index,
                supported,
            } => {
                let names: Vec<&str> = supported.iter().map(|p| p.as_str()).collect();
                logger.info(&format!(
                    "Camera {} supports: {}",
                    device_index,
                    names.join(", ")
                ));
            }
            CaptureEvent::RangesDiscovered { ranges, .. } => {
                for (property, range) in ranges.iter() {
                    logger.debug(&format!(
                        "{}: {} (range {}..={})",
                        property, range.current, range.min, range.max
                    ));
                }
            }
            CaptureEvent::OpenFailed {
                device_index,
                reason,
            } => {
                logger.error(&format!("Camera {} failed to open: {}", device_index, reason));
                self.failure = Some(reason);
            }
            CaptureEvent::Closed { device_index } => {
                logger.info(&format!("Camera {} closed", device_index));
            }
            CaptureEvent::PropertyRejected {
                property,
                value,
                reason,
            } => {
                self.rejected += 1;
                logger.warn(&format!("{} = {} rejected: {}", property, value, reason));
            }
            CaptureEvent::SettingsChanged(settings) => {
                logger.debug(&format!("Requested settings: {:?}", settings));
            }
        }
    }
}

pub fn run(args: StreamArgs, config: &ControllerConfig, logger: &Logger) -> CommandResult {
    let request = open_request(&args, config)?;
    let (sender, receiver) = mpsc::sync_channel(config.capture.event_queue_capacity.max(1));
    let store = CalibrationStore::new(
        &config.calibration.output_dir,
        logger.for_component("calibration"),
    );

    let mut engine = CaptureEngine::with_store(
        &store,
        sender,
        config.capture.engine_config()?,
        logger.for_component("engine"),
    )?;
    engine.request_open(request);

    let keep_last = args.save_last.is_some();
    let mut stats = StreamStats::default();
    let deadline = Instant::now() + Duration::from_secs(args.seconds);

    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        let event = match receiver.recv_timeout(remaining) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        };

        // Writes go out only once the device is up; earlier posts would be discarded on open
        if matches!(event, CaptureEvent::DeviceOpened { .. }) {
            apply_settings(&engine, &args.settings, logger);
        }
        stats.record(event, keep_last, logger);
    }

    engine.stop()?;
    println!(
        "Streamed {} frames ({} property writes rejected)",
        stats.frames, stats.rejected
    );

    if !stats.opened
        && let Some(reason) = stats.failure
    {
        return Err(reason.into());
    }

    if let Some(path) = args.save_last.as_deref() {
        save_last(path, stats.last_frame.as_ref(), logger)?;
    }
    Ok(())
}

fn open_request(args: &StreamArgs, config: &ControllerConfig) -> vision::Result<OpenRequest> {
    let device = args.device.unwrap_or(config.capture.device_index);
    let (width, height) = match (args.width, args.height) {
        (Some(w), Some(h)) => (w, h),
        _ => (config.capture.width, config.capture.height),
    };
    OpenRequest::new(device)?.with_resolution(width, height)
}

fn apply_settings(engine: &CaptureEngine, settings: &[(PropertyId, i32)], logger: &Logger) {
    for &(property, value) in settings {
        logger.info(&format!("Setting {} = {}", property, value));
        engine.set_property(property, value);
    }
}

fn save_last(path: &Path, frame: Option<&VideoFrame>, logger: &Logger) -> CommandResult {
    let Some(frame) = frame else {
        logger.warn("No frame received, nothing saved");
        return Ok(());
    };

    write_frame(path, frame)?;
    println!("Last frame saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vision::video::{PropertyRanges, SupportedProperties};

    fn args() -> StreamArgs {
        StreamArgs {
            device: None,
            width: None,
            height: None,
            seconds: 1,
            settings: Vec::new(),
            save_last: None,
        }
    }

    #[test]
    fn test_open_request_prefers_arguments() {
        let config = ControllerConfig::default();
        let request = open_request(&args(), &config).unwrap();
        assert_eq!(request.device_index(), 0);
        assert_eq!(request.resolution(), Some((640, 480)));

        let overridden = StreamArgs {
            device: Some(3),
            width: Some(1280),
            height: Some(720),
            ..args()
        };
        let request = open_request(&overridden, &config).unwrap();
        assert_eq!(request.device_index(), 3);
        assert_eq!(request.resolution(), Some((1280, 720)));
    }

    #[test]
    fn test_stats_track_session() {
        let logger = Logger::discard();
        let mut stats = StreamStats::default();

        stats.record(
            CaptureEvent::OpenFailed {
                device_index: 9,
                reason: "no such camera".to_string(),
            },
            false,
            &logger,
        );
        assert_eq!(stats.failure.as_deref(), Some("no such camera"));

        stats.record(
            CaptureEvent::DeviceOpened {
                device_index: 9,
                width: 64,
                height: 48,
            },
            false,
            &logger,
        );
        stats.record(
            CaptureEvent::PropertiesSupported {
                device_index: 9,
                supported: SupportedProperties::default(),
            },
            false,
            &logger,
        );
        stats.record(
            CaptureEvent::RangesDiscovered {
                device_index: 9,
                ranges: PropertyRanges::default(),
            },
            false,
            &logger,
        );
        stats.record(
            CaptureEvent::PropertyRejected {
                property: PropertyId::Focus,
                value: 7,
                reason: "unsupported".to_string(),
            },
            false,
            &logger,
        );

        assert!(stats.opened);
        assert!(stats.failure.is_none());
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn test_save_last_without_frame_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last.png");

        assert!(save_last(&path, None, &Logger::discard()).is_ok());
        assert!(!path.exists());
    }
}
