//! Video capture and frame processing.

pub mod camera;
pub mod correction;
pub mod frame;

pub use camera::{
    CameraDetection, CameraInfo, CaptureBackend, DeviceController, OpenCvBackend, OpenRequest,
    PropertyId, PropertyRange, PropertyRanges, SupportedProperties,
};
pub use correction::FrameCorrector;
pub use frame::{PixelLayout, VideoFrame};
