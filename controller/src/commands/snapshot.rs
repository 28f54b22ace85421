//! Single-frame capture into the calibration image folder

use logging::Logger;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};
use vision::calibration::save_snapshot;
use vision::{CalibrationStore, CaptureEngine, CaptureEvent, OpenRequest, VideoFrame};

use super::CommandResult;
use crate::cli::SnapshotArgs;
use crate::config::ControllerConfig;

const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

pub fn run(args: SnapshotArgs, config: &ControllerConfig, logger: &Logger) -> CommandResult {
    let device = args.device.unwrap_or(config.capture.device_index);
    let request = OpenRequest::new(device)?
        .with_resolution(config.capture.width, config.capture.height)?;
    let dir = args
        .dir
        .unwrap_or_else(|| PathBuf::from(&config.calibration.images_dir));

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

    let frame = wait_for_frame(&receiver, FIRST_FRAME_TIMEOUT);
    engine.stop()?;

    let frame = frame?;
    let path = save_snapshot(&dir, &frame)?;
    logger.info(&format!("Snapshot saved to {}", path.display()));
    println!("{}", path.display());
    Ok(())
}

/// First frame on `receiver`, or the reason none arrived
fn wait_for_frame(
    receiver: &mpsc::Receiver<CaptureEvent>,
    timeout: Duration,
) -> Result<VideoFrame, String> {
    let deadline = Instant::now() + timeout;

    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match receiver.recv_timeout(remaining) {
            Ok(CaptureEvent::Frame(frame)) => return Ok(frame),
            Ok(CaptureEvent::OpenFailed { reason, .. }) => return Err(reason),
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => break,
            Err(RecvTimeoutError::Disconnected) => {
                return Err("Capture engine stopped".to_string());
            }
        }
    }
    Err(format!("No frame within {:?}", timeout))
}
