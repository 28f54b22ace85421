//! Camera calibration solve.

use crate::common::constants::calibration::{
    DEFAULT_ALPHA, MIN_SAMPLES, SOLVER_EPSILON, SOLVER_MAX_ITER,
};
use crate::error::{Result, VisionError};
use opencv::calib3d;
use opencv::core::{Mat, Point2f, Point3f, Rect, Size, TermCriteria, TermCriteria_Type, Vector};
use opencv::prelude::*;

use super::intrinsics::{CameraIntrinsics, matrix3_from_mat, vector_from_mat};
use super::pattern::PatternGeometry;
use super::sample::CalibrationSample;

/// Pose of one sample relative to the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrinsics {
    /// Rodrigues rotation vector
    pub rotation: [f64; 3],
    pub translation: [f64; 3],
}

/// Outcome of a successful solve
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub intrinsics: CameraIntrinsics,
    /// RMS reprojection error in pixels
    pub rms_error: f64,
    pub image_size: Size,
    pub sample_count: usize,
    /// Pose of the first sample
    pub reference_extrinsics: Extrinsics,
}

/// Stateless solver for intrinsics, distortion and the optimal rectified matrix
#[derive(Debug, Clone, Copy)]
pub struct CalibrationSolver {
    alpha: f64,
}

impl CalibrationSolver {
    /// `alpha` is the free scaling parameter of the optimal matrix: 0 keeps only
    /// valid pixels, 1 keeps every source pixel.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(VisionError::Config(format!(
                "Alpha must be between 0 and 1, got {}",
                alpha
            )));
        }
        Ok(CalibrationSolver { alpha })
    }

    pub fn solve(
        &self,
        samples: &[CalibrationSample],
        pattern: &PatternGeometry,
        image_size: Size,
    ) -> Result<CalibrationReport> {
        if samples.len() < MIN_SAMPLES {
            return Err(VisionError::InsufficientSamples {
                found: samples.len(),
                required: MIN_SAMPLES,
            });
        }

        if image_size.width <= 0 || image_size.height <= 0 {
            return Err(VisionError::Calibration(format!(
                "Invalid image size {}x{}",
                image_size.width, image_size.height
            )));
        }

        if let Some(bad) = samples.iter().find(|s| s.len() != pattern.corner_count()) {
            return Err(VisionError::Calibration(format!(
                "Sample has {} corners, pattern expects {}",
                bad.len(),
                pattern.corner_count()
            )));
        }

        let object_points: Vector<Vector<Point3f>> =
            samples.iter().map(|s| s.object_points().clone()).collect();
        let image_points: Vector<Vector<Point2f>> =
            samples.iter().map(|s| s.image_points().clone()).collect();

        let mut camera_matrix = Mat::default();
        let mut dist_coeffs = Mat::default();
        let mut rvecs: Vector<Mat> = Vector::new();
        let mut tvecs: Vector<Mat> = Vector::new();

        let rms_error = calib3d::calibrate_camera(
            &object_points,
            &image_points,
            image_size,
            &mut camera_matrix,
            &mut dist_coeffs,
            &mut rvecs,
            &mut tvecs,
            0,
            TermCriteria::new(
                TermCriteria_Type::COUNT as i32 + TermCriteria_Type::EPS as i32,
                SOLVER_MAX_ITER,
                SOLVER_EPSILON,
            )?,
        )?;

        if !rms_error.is_finite() || rms_error < 0.0 {
            return Err(VisionError::Calibration(format!(
                "Solver did not converge (reprojection error {})",
                rms_error
            )));
        }

        let mut roi = Rect::default();
        let optimal = calib3d::get_optimal_new_camera_matrix(
            &camera_matrix,
            &dist_coeffs,
            image_size,
            self.alpha,
            image_size,
            Some(&mut roi),
            false,
        )?;

        let intrinsics = CameraIntrinsics::new(
            matrix3_from_mat(&camera_matrix)?,
            vector_from_mat(&dist_coeffs)?,
            Some(matrix3_from_mat(&optimal)?),
            Some(roi.into()),
        )?;

        Ok(CalibrationReport {
            intrinsics,
            rms_error,
            image_size,
            sample_count: samples.len(),
            reference_extrinsics: Extrinsics {
                rotation: vec3(&rvecs.get(0)?)?,
                translation: vec3(&tvecs.get(0)?)?,
            },
        })
    }
}

impl Default for CalibrationSolver {
    fn default() -> Self {
        CalibrationSolver {
            alpha: DEFAULT_ALPHA,
        }
    }
}

fn vec3(mat: &Mat) -> Result<[f64; 3]> {
    match vector_from_mat(mat)?.as_slice() {
        &[x, y, z] => Ok([x, y, z]),
        other => Err(VisionError::Calibration(format!(
            "Expected a 3-vector, got {} values",
            other.len()
        ))),
    }
}
