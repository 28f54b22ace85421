//! Camera calibration
//!
//! Checkerboard extraction, the intrinsics solve, artifact persistence and the
//! folder-level batch entry point.

pub mod batch;
pub mod extractor;
pub mod intrinsics;
pub mod pattern;
pub mod sample;
pub mod snapshot;
pub mod solver;
pub mod store;

pub use batch::{BatchError, BatchReport, CalibrationBatch, scan_images};
pub use extractor::CalibrationSampleExtractor;
pub use intrinsics::{CameraIntrinsics, Matrix3, RegionOfInterest};
pub use pattern::PatternGeometry;
pub use sample::CalibrationSample;
pub use snapshot::{next_snapshot_path, read_frame, save_snapshot, write_frame};
pub use solver::{CalibrationReport, CalibrationSolver, Extrinsics};
pub use store::CalibrationStore;
