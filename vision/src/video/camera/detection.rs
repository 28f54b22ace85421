//! Camera device enumeration.
//!
//! Candidate indices come from the platform (`/dev/video*` on Linux, a fixed
//! list elsewhere); each candidate is opened through a [`CaptureBackend`] to
//! confirm it is usable.

use crate::error::Result;
use logging::Logger;
use opencv::videoio::{CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};

use super::backend::{CaptureBackend, OpenCvBackend};
use super::info::CameraInfo;

const MAX_WIDTH: u32 = 7680;
const MAX_HEIGHT: u32 = 4320;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;

/// Camera device detection and enumeration
pub struct CameraDetection;

impl CameraDetection {
    /// Lists usable devices using the OpenCV backend
    pub fn list_devices(logger: &Logger) -> Result<Vec<CameraInfo>> {
        let mut backend = OpenCvBackend::new();
        Ok(Self::scan_candidates(
            &mut backend,
            &Self::candidate_indices(),
            logger,
        ))
    }

    /// Opens each candidate through `backend` and keeps the ones that respond
    pub fn scan_candidates<B: CaptureBackend>(
        backend: &mut B,
        candidates: &[i32],
        logger: &Logger,
    ) -> Vec<CameraInfo> {
        logger.info(&format!(
            "Checking {} potential video device(s)",
            candidates.len()
        ));

        let mut cameras = Vec::new();
        for &index in candidates {
            match backend.open(index, 0, 0) {
                Ok(()) if backend.is_opened() => {
                    let (width, height) = Self::native_resolution(backend, index, logger);
                    backend.release();

                    let info = CameraInfo::new(index, Self::device_name(index), width, height);
                    logger.info(&format!("Found {}", info));
                    cameras.push(info);
                }
                Ok(()) => {
                    backend.release();
                    logger.debug(&format!("Device {} is not usable", index));
                }
                Err(e) => {
                    backend.release();
                    logger.debug(&format!("Device {} is not usable: {}", index, e));
                }
            }
        }

        if cameras.is_empty() {
            logger.warn("No cameras detected");
        }
        cameras
    }

    fn native_resolution<B: CaptureBackend>(backend: &B, index: i32, logger: &Logger) -> (u32, u32) {
        let width = backend.get(CAP_PROP_FRAME_WIDTH).max(0.0) as u32;
        let height = backend.get(CAP_PROP_FRAME_HEIGHT).max(0.0) as u32;

        if width > 0 && height > 0 && width <= MAX_WIDTH && height <= MAX_HEIGHT {
            (width, height)
        } else {
            logger.debug(&format!(
                "Device {} reported invalid resolution {}x{}, using {}x{}",
                index, width, height, DEFAULT_WIDTH, DEFAULT_HEIGHT
            ));
            (DEFAULT_WIDTH, DEFAULT_HEIGHT)
        }
    }

    /// Candidate indices from `/dev/video*` (even nodes only; odd ones carry metadata)
    #[cfg(target_os = "linux")]
    pub fn candidate_indices() -> Vec<i32> {
        let mut ids: Vec<i32> = std::fs::read_dir("/dev")
            .map(|entries| {
                entries
                    .flatten()
                    .filter_map(|e| {
                        e.file_name()
                            .to_str()
                            .and_then(|n| n.strip_prefix("video"))
                            .and_then(|id| id.parse::<i32>().ok())
                    })
                    .filter(|id| id % 2 == 0 && *id < 20)
                    .collect()
            })
            .unwrap_or_default();

        ids.sort_unstable();
        if ids.is_empty() {
            ids.push(0);
        }
        ids
    }

    #[cfg(not(target_os = "linux"))]
    pub fn candidate_indices() -> Vec<i32> {
        vec![0, 1, 2, 3]
    }

    #[cfg(target_os = "linux")]
    fn device_name(index: i32) -> String {
        std::fs::read_to_string(format!("/sys/class/video4linux/video{}/name", index))
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|_| format!("Camera {}", index))
    }

    #[cfg(not(target_os = "linux"))]
    fn device_name(index: i32) -> String {
        format!("Camera {}", index)
    }
}
