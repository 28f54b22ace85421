//! Video capture engine and camera calibration.
//!
//! - [`engine`]: a dedicated capture thread fed by lock-free mailboxes,
//!   publishing corrected frames and device notifications
//! - [`video`]: device access, frames and lens correction
//! - [`calibration`]: checkerboard extraction, solving, persistence and the
//!   folder-level batch entry point
//! - [`processing`]: perspective crop, colour segmentation and contour
//!   detection on captured frames

pub mod calibration;
pub mod common;
pub mod engine;
pub mod error;
pub mod processing;
pub mod video;

pub use error::{Result, VisionError};

pub use calibration::{
    BatchError, BatchReport, CalibrationBatch, CalibrationReport, CalibrationSampleExtractor,
    CalibrationSolver, CalibrationStore, CameraIntrinsics, PatternGeometry,
};
pub use engine::{CaptureEngine, CaptureEvent, EngineConfig, EngineHandle, EngineState, EventSink};
pub use processing::{FrameProcessor, ProcessingMode, Quad};
pub use video::{
    CameraDetection, CameraInfo, CaptureBackend, FrameCorrector, OpenCvBackend, OpenRequest,
    PropertyId, PropertyRange, VideoFrame,
};
