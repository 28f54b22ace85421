//! Solved camera model.

use crate::error::{Result, VisionError};
use opencv::core::{CV_64F, Mat, Rect};
use opencv::prelude::*;
use serde::{Deserialize, Serialize};

/// Row-major 3×3 matrix
pub type Matrix3 = [[f64; 3]; 3];

/// Valid-pixel rectangle of the rectified image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<Rect> for RegionOfInterest {
    fn from(rect: Rect) -> Self {
        RegionOfInterest {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

impl From<RegionOfInterest> for Rect {
    fn from(roi: RegionOfInterest) -> Self {
        Rect::new(roi.x, roi.y, roi.width, roi.height)
    }
}

/// Intrinsic matrix, distortion coefficients and optional rectified matrix
///
/// Immutable once produced by the solver or loaded from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraIntrinsics {
    camera_matrix: Matrix3,
    distortion: Vec<f64>,
    optimal_matrix: Option<Matrix3>,
    roi: Option<RegionOfInterest>,
}

impl CameraIntrinsics {
    /// Builds intrinsics after checking every value is finite and the
    /// distortion vector is non-empty.
    pub fn new(
        camera_matrix: Matrix3,
        distortion: Vec<f64>,
        optimal_matrix: Option<Matrix3>,
        roi: Option<RegionOfInterest>,
    ) -> Result<Self> {
        if distortion.is_empty() {
            return Err(VisionError::Calibration(
                "Distortion coefficient vector is empty".to_string(),
            ));
        }

        let finite = camera_matrix.iter().flatten().all(|v| v.is_finite())
            && distortion.iter().all(|v| v.is_finite())
            && optimal_matrix
                .iter()
                .flatten()
                .flatten()
                .all(|v| v.is_finite());
        if !finite {
            return Err(VisionError::Calibration(
                "Calibration contains non-finite values".to_string(),
            ));
        }

        Ok(CameraIntrinsics {
            camera_matrix,
            distortion,
            optimal_matrix,
            roi,
        })
    }

    pub fn camera_matrix(&self) -> &Matrix3 {
        &self.camera_matrix
    }

    pub fn distortion(&self) -> &[f64] {
        &self.distortion
    }

    pub fn optimal_matrix(&self) -> Option<&Matrix3> {
        self.optimal_matrix.as_ref()
    }

    pub fn roi(&self) -> Option<RegionOfInterest> {
        self.roi
    }

    /// Camera matrix as a 3×3 `CV_64F` Mat
    pub fn camera_matrix_mat(&self) -> Result<Mat> {
        Ok(Mat::from_slice_2d(&self.camera_matrix)?)
    }

    /// Distortion coefficients as a 1×N `CV_64F` Mat
    pub fn distortion_mat(&self) -> Result<Mat> {
        Ok(Mat::from_slice(self.distortion.as_slice())?.try_clone()?)
    }

    /// Optimal matrix as a Mat, or an empty Mat (meaning "reuse the camera matrix")
    pub fn optimal_matrix_mat(&self) -> Result<Mat> {
        match self.optimal_matrix {
            Some(ref m) => Ok(Mat::from_slice_2d(m)?),
            None => Ok(Mat::default()),
        }
    }
}

/// Reads a 3×3 `CV_64F` Mat into a row-major array
pub fn matrix3_from_mat(mat: &Mat) -> Result<Matrix3> {
    if mat.rows() != 3 || mat.cols() != 3 || mat.typ() != CV_64F {
        return Err(VisionError::Calibration(format!(
            "Expected a 3x3 CV_64F matrix, got {}x{} (type {})",
            mat.rows(),
            mat.cols(),
            mat.typ()
        )));
    }

    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = *mat.at_2d::<f64>(r as i32, c as i32)?;
        }
    }
    Ok(out)
}

/// Reads a single-row or single-column `CV_64F` Mat into a vector
pub fn vector_from_mat(mat: &Mat) -> Result<Vec<f64>> {
    if mat.typ() != CV_64F || (mat.rows() != 1 && mat.cols() != 1) {
        return Err(VisionError::Calibration(format!(
            "Expected a CV_64F vector, got {}x{} (type {})",
            mat.rows(),
            mat.cols(),
            mat.typ()
        )));
    }

    let continuous = mat.try_clone()?;
    Ok(continuous.data_typed::<f64>()?.to_vec())
}
