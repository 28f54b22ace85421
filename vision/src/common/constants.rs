//! Common constants shared across vision modules

/// Logging intervals for frame processing
pub mod logging {
    /// Log progress every N frames (capture loop)
    pub const CAMERA_LOG_INTERVAL: u64 = 1000;
}

/// Notification delivery
pub mod events {
    /// Undelivered control notifications kept for retry; the oldest is dropped beyond this
    pub const CONTROL_BACKLOG_LIMIT: usize = 256;
}

/// Capture loop timing defaults
pub mod timing {
    use std::time::Duration;

    /// Sleep between iterations while no device is open
    pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);
    /// Sleep after a read that produced no frame
    pub const NO_FRAME_RETRY_INTERVAL: Duration = Duration::from_millis(1);
}

/// Device property defaults
pub mod properties {
    /// Lower bound reported for every property range
    pub const RANGE_MIN: i32 = 0;
    /// Upper bound reported for every property range
    pub const RANGE_MAX: i32 = 255;
    /// Seeded current value when a device reports exactly zero
    pub const RANGE_MIDPOINT: i32 = 126;
    /// Largest accepted frame dimension (8K)
    pub const MAX_DIMENSION: i32 = 7680;
}

/// Calibration constants
pub mod calibration {
    /// Minimum number of accepted samples for a solve
    pub const MIN_SAMPLES: usize = 5;
    /// Sub-pixel refinement search window half-size
    pub const SUBPIX_WINDOW: i32 = 11;
    /// Sub-pixel refinement iteration cap
    pub const SUBPIX_MAX_ITER: i32 = 30;
    /// Sub-pixel refinement epsilon
    pub const SUBPIX_EPSILON: f64 = 0.001;
    /// Solver iteration cap
    pub const SOLVER_MAX_ITER: i32 = 100;
    /// Solver absolute-change epsilon
    pub const SOLVER_EPSILON: f64 = f64::EPSILON;
    /// Free scaling parameter for the optimal camera matrix (keep all pixels)
    pub const DEFAULT_ALPHA: f64 = 1.0;
    /// Output folder for calibration artifacts
    pub const DEFAULT_OUTPUT_DIR: &str = "calibration";
    /// Camera matrix document name
    pub const CAMERA_MATRIX_FILE: &str = "camera_matrix.json";
    /// Distortion coefficients document name
    pub const DISTORTION_FILE: &str = "distortion_coefficients.json";
    /// Image extensions considered by the batch entry point
    pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];
}

/// Frame processing defaults
pub mod processing {
    /// Lower HSV bound of the green segmentation mask (OpenCV hue scale 0..180)
    pub const GREEN_HSV_LOWER: [u8; 3] = [35, 100, 100];
    /// Upper HSV bound of the green segmentation mask
    pub const GREEN_HSV_UPPER: [u8; 3] = [85, 255, 255];
    /// Gaussian kernel side before edge detection
    pub const BLUR_KERNEL: i32 = 5;
    pub const CANNY_LOW_THRESHOLD: f64 = 50.0;
    pub const CANNY_HIGH_THRESHOLD: f64 = 150.0;
    /// Contours enclosing less area are ignored
    pub const MIN_CONTOUR_AREA: f64 = 100.0;
}
