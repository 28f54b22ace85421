//! Camera device information.

/// Information about an available camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    /// Device index accepted by `OpenRequest`
    pub device_index: i32,
    /// Device name reported by the platform
    pub name: String,
    /// Native frame width in pixels
    pub width: u32,
    /// Native frame height in pixels
    pub height: u32,
}

impl CameraInfo {
    pub fn new(device_index: i32, name: String, width: u32, height: u32) -> Self {
        Self {
            device_index,
            name,
            width,
            height,
        }
    }

    /// Returns a string representation of the resolution
    pub fn resolution_string(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl std::fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({})",
            self.device_index,
            self.name,
            self.resolution_string()
        )
    }
}
