//! Calibration artifact persistence.
//!
//! Two JSON documents live in the store directory:
//!
//! - `camera_matrix.json`: `camera_matrix`, optional `optimal_camera_matrix`,
//!   optional `valid_roi`
//! - `distortion_coefficients.json`: `distortion_coefficients`
//!
//! Loading never fails hard: a missing file, missing key or malformed document
//! means "no calibration".

use crate::common::constants::calibration::{CAMERA_MATRIX_FILE, DISTORTION_FILE};
use crate::error::{Result, VisionError};
use logging::Logger;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use super::intrinsics::{CameraIntrinsics, Matrix3, RegionOfInterest};

#[derive(Debug, Serialize, Deserialize)]
struct CameraMatrixDocument {
    #[serde(default)]
    camera_matrix: Option<Matrix3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    optimal_camera_matrix: Option<Matrix3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_roi: Option<RegionOfInterest>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DistortionDocument {
    #[serde(default)]
    distortion_coefficients: Option<Vec<f64>>,
}

/// Reads and writes [`CameraIntrinsics`] in one directory
#[derive(Clone)]
pub struct CalibrationStore {
    dir: PathBuf,
    logger: Logger,
}

impl CalibrationStore {
    pub fn new(dir: impl Into<PathBuf>, logger: Logger) -> Self {
        CalibrationStore {
            dir: dir.into(),
            logger,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn camera_matrix_path(&self) -> PathBuf {
        self.dir.join(CAMERA_MATRIX_FILE)
    }

    pub fn distortion_path(&self) -> PathBuf {
        self.dir.join(DISTORTION_FILE)
    }

    /// Writes both documents, creating the directory if needed
    pub fn save(&self, intrinsics: &CameraIntrinsics) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            VisionError::Persistence(format!(
                "Cannot create calibration directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let camera = CameraMatrixDocument {
            camera_matrix: Some(*intrinsics.camera_matrix()),
            optimal_camera_matrix: intrinsics.optimal_matrix().copied(),
            valid_roi: intrinsics.roi(),
        };
        let distortion = DistortionDocument {
            distortion_coefficients: Some(intrinsics.distortion().to_vec()),
        };

        write_document(&self.camera_matrix_path(), &camera)?;
        write_document(&self.distortion_path(), &distortion)?;

        self.logger.info(&format!(
            "Calibration saved to {}",
            self.dir.display()
        ));
        Ok(())
    }

    /// Loads both documents, or `None` if anything required is absent
    pub fn load(&self) -> Option<CameraIntrinsics> {
        let camera: CameraMatrixDocument = self.read_document(&self.camera_matrix_path())?;
        let distortion: DistortionDocument = self.read_document(&self.distortion_path())?;

        let Some(camera_matrix) = camera.camera_matrix else {
            self.logger.warn("Calibration file has no 'camera_matrix' entry");
            return None;
        };
        let Some(coefficients) = distortion.distortion_coefficients else {
            self.logger
                .warn("Calibration file has no 'distortion_coefficients' entry");
            return None;
        };

        match CameraIntrinsics::new(
            camera_matrix,
            coefficients,
            camera.optimal_camera_matrix,
            camera.valid_roi,
        ) {
            Ok(intrinsics) => {
                self.logger.info(&format!(
                    "Calibration loaded from {}",
                    self.dir.display()
                ));
                Some(intrinsics)
            }
            Err(e) => {
                self.logger.warn(&format!("Ignoring stored calibration: {}", e));
                None
            }
        }
    }

    fn read_document<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                self.logger.debug(&format!(
                    "No calibration at {}: {}",
                    path.display(),
                    e
                ));
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => Some(document),
            Err(e) => {
                self.logger
                    .warn(&format!("Malformed calibration file {}: {}", path.display(), e));
                None
            }
        }
    }
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json).map_err(|e| {
        VisionError::Persistence(format!("Cannot write {}: {}", path.display(), e))
    })
}
