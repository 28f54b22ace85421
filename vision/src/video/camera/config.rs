//! Validated device open requests.

use crate::common::constants::properties::MAX_DIMENSION;
use crate::error::{Result, VisionError};

/// "Open device N at resolution W×H"
///
/// A 0×0 resolution means "use the device default".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRequest {
    device_index: i32,
    width: i32,
    height: i32,
}

impl OpenRequest {
    /// Largest accepted device index
    pub const MAX_DEVICE_INDEX: i32 = u16::MAX as i32;

    /// Opens `device_index` at its default resolution
    pub fn new(device_index: i32) -> Result<Self> {
        if !(0..=Self::MAX_DEVICE_INDEX).contains(&device_index) {
            return Err(VisionError::InvalidRequest(format!(
                "Device index must be between 0 and {}, got {}",
                Self::MAX_DEVICE_INDEX,
                device_index
            )));
        }

        Ok(OpenRequest {
            device_index,
            width: 0,
            height: 0,
        })
    }

    /// Requests a specific resolution; `(0, 0)` resets to the device default
    pub fn with_resolution(mut self, width: i32, height: i32) -> Result<Self> {
        for (name, value) in [("Width", width), ("Height", height)] {
            if !(0..=MAX_DIMENSION).contains(&value) {
                return Err(VisionError::InvalidRequest(format!(
                    "{} must be between 0 and {}, got {}",
                    name, MAX_DIMENSION, value
                )));
            }
        }

        self.width = width;
        self.height = height;
        Ok(self)
    }

    pub fn device_index(&self) -> i32 {
        self.device_index
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Requested resolution if both dimensions are positive
    pub fn resolution(&self) -> Option<(i32, i32)> {
        (self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }
}
