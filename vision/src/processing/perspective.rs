//! Four-point perspective crop.

use crate::error::{Result, VisionError};
use opencv::core::{Mat, Point2f, Size, Vector};
use opencv::imgproc;
use opencv::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Image-space corners of the region to straighten
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub top_left: Point2f,
    pub top_right: Point2f,
    pub bottom_right: Point2f,
    pub bottom_left: Point2f,
}

impl Quad {
    pub fn new(
        top_left: Point2f,
        top_right: Point2f,
        bottom_right: Point2f,
        bottom_left: Point2f,
    ) -> Self {
        Quad {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Output size: the longer of each pair of opposite edges, truncated to whole pixels
    pub fn output_size(&self) -> Size {
        let width = distance(self.top_left, self.top_right)
            .max(distance(self.bottom_left, self.bottom_right));
        let height = distance(self.top_left, self.bottom_left)
            .max(distance(self.top_right, self.bottom_right));
        Size::new(width as i32, height as i32)
    }

    fn corners(&self) -> Vector<Point2f> {
        Vector::from_iter([
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ])
    }
}

fn distance(a: Point2f, b: Point2f) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ];
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            a.x, a.y, b.x, b.y, c.x, c.y, d.x, d.y
        )
    }
}

/// Parses eight comma-separated coordinates: top-left, top-right, bottom-right, bottom-left
impl FromStr for Quad {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("Invalid coordinate in '{}': {}", s, e))?;

        let &[x0, y0, x1, y1, x2, y2, x3, y3] = values.as_slice() else {
            return Err(format!(
                "Expected 8 coordinates (x,y for TL,TR,BR,BL), got {}",
                values.len()
            ));
        };

        Ok(Quad::new(
            Point2f::new(x0, y0),
            Point2f::new(x1, y1),
            Point2f::new(x2, y2),
            Point2f::new(x3, y3),
        ))
    }
}

/// Warps the region bounded by `quad` onto an upright rectangle of [`Quad::output_size`]
pub fn perspective_crop(image: &Mat, quad: &Quad) -> Result<Mat> {
    let size = quad.output_size();
    if size.width < 2 || size.height < 2 {
        return Err(VisionError::InvalidRequest(format!(
            "Crop region {} is degenerate ({}x{})",
            quad, size.width, size.height
        )));
    }

    let right = (size.width - 1) as f32;
    let bottom = (size.height - 1) as f32;
    let target = Vector::from_iter([
        Point2f::new(0.0, 0.0),
        Point2f::new(right, 0.0),
        Point2f::new(right, bottom),
        Point2f::new(0.0, bottom),
    ]);

    let transform = imgproc::get_perspective_transform_def(&quad.corners(), &target)?;
    if transform.empty() {
        return Err(VisionError::InvalidRequest(format!(
            "Crop region {} has no perspective transform",
            quad
        )));
    }

    let mut warped = Mat::default();
    imgproc::warp_perspective_def(image, &mut warped, &transform, size)?;
    Ok(warped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{CV_8UC3, Rect, Scalar, Vec3b};

    fn quad(points: [(f32, f32); 4]) -> Quad {
        let [a, b, c, d] = points.map(|(x, y)| Point2f::new(x, y));
        Quad::new(a, b, c, d)
    }

    #[test]
    fn test_axis_aligned_crop_keeps_region() {
        let mut image =
            Mat::new_rows_cols_with_default(200, 200, CV_8UC3, Scalar::new(255.0, 0.0, 0.0, 0.0))
                .unwrap();
        imgproc::rectangle(
            &mut image,
            Rect::new(50, 40, 100, 80),
            Scalar::new(0.0, 0.0, 255.0, 0.0),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let region = quad([(50.0, 40.0), (150.0, 40.0), (150.0, 120.0), (50.0, 120.0)]);
        let cropped = perspective_crop(&image, &region).unwrap();

        assert_eq!((cropped.cols(), cropped.rows()), (100, 80));
        let centre = cropped.at_2d::<Vec3b>(40, 50).unwrap();
        assert_eq!((centre[0], centre[2]), (0, 255));
    }

    #[test]
    fn test_trapezoid_size_uses_longer_edges() {
        let region = quad([(60.0, 20.0), (140.0, 20.0), (180.0, 180.0), (20.0, 180.0)]);

        // bottom edge 160 wide, slanted sides sqrt(40² + 160²) ≈ 164.9 tall
        assert_eq!(region.output_size(), Size::new(160, 164));

        let image = Mat::new_rows_cols_with_default(200, 200, CV_8UC3, Scalar::all(9.0)).unwrap();
        let cropped = perspective_crop(&image, &region).unwrap();
        assert_eq!((cropped.cols(), cropped.rows()), (160, 164));
    }

    #[test]
    fn test_degenerate_quad_rejected() {
        let image = Mat::new_rows_cols_with_default(50, 50, CV_8UC3, Scalar::all(0.0)).unwrap();
        let point = quad([(10.0, 10.0); 4]);
        assert!(matches!(
            perspective_crop(&image, &point),
            Err(VisionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_quad() {
        let parsed: Quad = "1,2, 3,4, 5,6, 7,8".parse().unwrap();
        assert_eq!(parsed.bottom_right, Point2f::new(5.0, 6.0));
        assert_eq!(parsed.to_string(), "1,2,3,4,5,6,7,8");

        assert!("1,2,3".parse::<Quad>().is_err());
        assert!("1,2,3,4,5,6,7,x".parse::<Quad>().is_err());
    }
}
