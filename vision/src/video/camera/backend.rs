//! Capture driver abstraction.
//!
//! [`CaptureBackend`] is the seam between the device controller and the
//! hardware layer. [`OpenCvBackend`] drives a real camera through OpenCV's
//! `VideoCapture`; tests substitute scripted implementations.

use crate::error::{Result, VisionError};
use crate::video::frame::VideoFrame;
use opencv::prelude::*;
use opencv::videoio::{CAP_ANY, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH, VideoCapture};

/// Minimal driver surface the device controller needs
pub trait CaptureBackend: Send {
    /// Opens device `index`. Resolution is applied only when both dimensions are positive.
    fn open(&mut self, index: i32, width: i32, height: i32) -> Result<()>;

    fn is_opened(&self) -> bool;

    /// Releases the device. Releasing a closed backend is a no-op.
    fn release(&mut self);

    /// Reads a raw `CAP_PROP_*` value
    fn get(&self, prop: i32) -> f64;

    /// Writes a raw `CAP_PROP_*` value, returning whether the driver accepted it
    fn set(&mut self, prop: i32, value: f64) -> bool;

    /// Pulls the next frame; `Ok(None)` means nothing is ready yet
    fn read(&mut self) -> Result<Option<VideoFrame>>;

    /// Explicit capability query. `None` when the driver cannot answer.
    fn query_support(&self, _prop: i32) -> Option<bool> {
        None
    }
}

/// OpenCV `VideoCapture` backed driver
pub struct OpenCvBackend {
    capture: Option<VideoCapture>,
}

impl OpenCvBackend {
    pub fn new() -> Self {
        OpenCvBackend { capture: None }
    }
}

impl Default for OpenCvBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for OpenCvBackend {
    fn open(&mut self, index: i32, width: i32, height: i32) -> Result<()> {
        self.release();

        let mut capture = VideoCapture::new(index, CAP_ANY)
            .map_err(|e| VisionError::Device(format!("Failed to open camera {}: {}", index, e)))?;

        let opened = capture.is_opened().map_err(|e| {
            VisionError::Device(format!("Error verifying camera {} status: {}", index, e))
        })?;
        if !opened {
            let _ = capture.release();
            return Err(VisionError::Device(format!(
                "Camera {} is not available",
                index
            )));
        }

        // A refused size is not fatal: the device controller compares the
        // request with the size the driver reports and logs the difference
        if width > 0 && height > 0 {
            let _ = capture.set(CAP_PROP_FRAME_WIDTH, f64::from(width));
            let _ = capture.set(CAP_PROP_FRAME_HEIGHT, f64::from(height));
        }

        self.capture = Some(capture);
        Ok(())
    }

    fn is_opened(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(|c| c.is_opened().unwrap_or(false))
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            let _ = capture.release();
        }
    }

    fn get(&self, prop: i32) -> f64 {
        self.capture
            .as_ref()
            .and_then(|c| c.get(prop).ok())
            .unwrap_or(0.0)
    }

    fn set(&mut self, prop: i32, value: f64) -> bool {
        self.capture
            .as_mut()
            .is_some_and(|c| c.set(prop, value).unwrap_or(false))
    }

    fn read(&mut self) -> Result<Option<VideoFrame>> {
        let Some(capture) = self.capture.as_mut() else {
            return Err(VisionError::DeviceNotOpen);
        };

        let mut mat = Mat::default();
        let success = capture
            .read(&mut mat)
            .map_err(|e| VisionError::Device(format!("Failed to read frame: {}", e)))?;

        if !success || mat.empty() || mat.cols() == 0 || mat.rows() == 0 {
            return Ok(None);
        }

        Ok(Some(VideoFrame::new(mat)))
    }
}

impl Drop for OpenCvBackend {
    fn drop(&mut self) {
        self.release();
    }
}
