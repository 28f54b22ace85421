//! Checkerboard geometry.

use crate::error::{Result, VisionError};
use opencv::core::{Point3f, Size, Vector};

/// Known layout of the calibration checkerboard
///
/// `columns` × `rows` counts inner corners, not squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternGeometry {
    columns: i32,
    rows: i32,
    square_size: f32,
}

impl PatternGeometry {
    const MIN_CORNERS: i32 = 2;
    const MAX_CORNERS: i32 = 1000;

    pub fn new(columns: i32, rows: i32, square_size: f32) -> Result<Self> {
        if columns < Self::MIN_CORNERS || rows < Self::MIN_CORNERS {
            return Err(VisionError::Config(format!(
                "Pattern needs at least {} inner corners per side, got {}x{}",
                Self::MIN_CORNERS,
                columns,
                rows
            )));
        }

        if columns > Self::MAX_CORNERS || rows > Self::MAX_CORNERS {
            return Err(VisionError::Config(format!(
                "Pattern allows at most {} inner corners per side, got {}x{}",
                Self::MAX_CORNERS,
                columns,
                rows
            )));
        }

        if !square_size.is_finite() || square_size <= 0.0 {
            return Err(VisionError::Config(format!(
                "Square size must be a positive number, got {}",
                square_size
            )));
        }

        Ok(PatternGeometry {
            columns,
            rows,
            square_size,
        })
    }

    /// Inner corners per row
    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// Inner corners per column
    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn square_size(&self) -> f32 {
        self.square_size
    }

    /// `(columns, rows)` as expected by the corner finder
    pub fn pattern_size(&self) -> Size {
        Size::new(self.columns, self.rows)
    }

    pub fn corner_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// Corner positions on the board plane (z = 0), row by row
    pub fn object_points(&self) -> Vector<Point3f> {
        let mut points = Vector::with_capacity(self.corner_count());
        for row in 0..self.rows {
            for col in 0..self.columns {
                points.push(Point3f::new(
                    col as f32 * self.square_size,
                    row as f32 * self.square_size,
                    0.0,
                ));
            }
        }
        points
    }
}

impl Default for PatternGeometry {
    /// 9×6 inner corners, 10 mm squares
    fn default() -> Self {
        PatternGeometry {
            columns: 9,
            rows: 6,
            square_size: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_points_row_major() {
        let pattern = PatternGeometry::new(3, 2, 25.0).unwrap();
        let points = pattern.object_points();

        assert_eq!(points.len(), 6);
        assert_eq!(points.get(0).unwrap(), Point3f::new(0.0, 0.0, 0.0));
        assert_eq!(points.get(2).unwrap(), Point3f::new(50.0, 0.0, 0.0));
        assert_eq!(points.get(3).unwrap(), Point3f::new(0.0, 25.0, 0.0));
        assert!(points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_default_pattern() {
        let pattern = PatternGeometry::default();
        assert_eq!(pattern.pattern_size(), Size::new(9, 6));
        assert_eq!(pattern.corner_count(), 54);
    }

    #[test]
    fn test_too_few_corners() {
        assert!(PatternGeometry::new(1, 6, 10.0).is_err());
        assert!(PatternGeometry::new(9, 1, 10.0).is_err());
        assert!(PatternGeometry::new(2, 2, 10.0).is_ok());
    }

    #[test]
    fn test_invalid_square_size() {
        assert!(PatternGeometry::new(9, 6, 0.0).is_err());
        assert!(PatternGeometry::new(9, 6, -1.0).is_err());
        assert!(PatternGeometry::new(9, 6, f32::NAN).is_err());
    }

    #[test]
    fn test_oversized_pattern_rejected() {
        assert!(PatternGeometry::new(70_000, 70_000, 10.0).is_err());
        assert!(PatternGeometry::new(1001, 6, 10.0).is_err());

        let largest = PatternGeometry::new(1000, 1000, 1.0).unwrap();
        assert_eq!(largest.corner_count(), 1_000_000);
    }
}
