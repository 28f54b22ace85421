//! One accepted calibration image.

use crate::error::{Result, VisionError};
use opencv::core::{Point2f, Point3f, Vector};

use super::pattern::PatternGeometry;

/// Board points paired with their detected image positions
///
/// Both sequences always hold exactly `pattern.corner_count()` entries.
#[derive(Debug, Clone)]
pub struct CalibrationSample {
    object_points: Vector<Point3f>,
    image_points: Vector<Point2f>,
}

impl CalibrationSample {
    pub fn new(pattern: &PatternGeometry, image_points: Vector<Point2f>) -> Result<Self> {
        let expected = pattern.corner_count();
        if image_points.len() != expected {
            return Err(VisionError::Calibration(format!(
                "Expected {} corners, got {}",
                expected,
                image_points.len()
            )));
        }

        Ok(CalibrationSample {
            object_points: pattern.object_points(),
            image_points,
        })
    }

    pub fn object_points(&self) -> &Vector<Point3f> {
        &self.object_points
    }

    pub fn image_points(&self) -> &Vector<Point2f> {
        &self.image_points
    }

    pub fn len(&self) -> usize {
        self.image_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_points.is_empty()
    }
}
