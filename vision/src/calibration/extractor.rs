//! Checkerboard corner extraction.

use crate::common::constants::calibration::{SUBPIX_EPSILON, SUBPIX_MAX_ITER, SUBPIX_WINDOW};
use crate::error::Result;
use opencv::calib3d;
use opencv::core::{Mat, Point2f, Size, TermCriteria, TermCriteria_Type, Vector};
use opencv::imgproc;
use opencv::prelude::*;

use super::pattern::PatternGeometry;
use super::sample::CalibrationSample;

/// Finds the inner-corner grid of one pattern geometry in raw images
#[derive(Debug, Clone, Copy)]
pub struct CalibrationSampleExtractor {
    pattern: PatternGeometry,
}

impl CalibrationSampleExtractor {
    pub fn new(pattern: PatternGeometry) -> Self {
        CalibrationSampleExtractor { pattern }
    }

    pub fn pattern(&self) -> &PatternGeometry {
        &self.pattern
    }

    /// Returns the sub-pixel refined sample, or `None` when the grid is not found.
    ///
    /// OpenCV failures (empty or unsupported images) are reported as "not found".
    pub fn extract(&self, image: &Mat) -> Option<CalibrationSample> {
        self.try_extract(image).ok().flatten()
    }

    fn try_extract(&self, image: &Mat) -> Result<Option<CalibrationSample>> {
        if image.empty() {
            return Ok(None);
        }

        let gray = to_gray(image)?;
        let mut corners: Vector<Point2f> = Vector::new();
        let found = calib3d::find_chessboard_corners(
            &gray,
            self.pattern.pattern_size(),
            &mut corners,
            calib3d::CALIB_CB_ADAPTIVE_THRESH | calib3d::CALIB_CB_NORMALIZE_IMAGE,
        )?;

        if !found || corners.len() != self.pattern.corner_count() {
            return Ok(None);
        }

        imgproc::corner_sub_pix(
            &gray,
            &mut corners,
            Size::new(SUBPIX_WINDOW, SUBPIX_WINDOW),
            Size::new(-1, -1),
            TermCriteria::new(
                TermCriteria_Type::COUNT as i32 + TermCriteria_Type::EPS as i32,
                SUBPIX_MAX_ITER,
                SUBPIX_EPSILON,
            )?,
        )?;

        Ok(Some(CalibrationSample::new(&self.pattern, corners)?))
    }
}

/// Single-channel copy of an 8-bit gray, BGR or BGRA image
fn to_gray(image: &Mat) -> Result<Mat> {
    let code = match image.channels() {
        3 => imgproc::COLOR_BGR2GRAY,
        4 => imgproc::COLOR_BGRA2GRAY,
        _ => return Ok(image.try_clone()?),
    };

    let mut gray = Mat::default();
    imgproc::cvt_color_def(image, &mut gray, code)?;
    Ok(gray)
}
