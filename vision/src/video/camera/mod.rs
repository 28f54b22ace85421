//! Camera device access
//!
//! Driver abstraction, device lifecycle, property discovery and enumeration.

pub mod backend;
pub mod config;
pub mod controller;
pub mod detection;
pub mod info;
pub mod properties;

pub use backend::{CaptureBackend, OpenCvBackend};
pub use config::OpenRequest;
pub use controller::DeviceController;
pub use detection::CameraDetection;
pub use info::CameraInfo;
pub use properties::{PropertyId, PropertyRange, PropertyRanges, SupportedProperties};
