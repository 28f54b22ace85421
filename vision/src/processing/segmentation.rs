//! Colour segmentation in HSV space.

use crate::common::constants::processing::{GREEN_HSV_LOWER, GREEN_HSV_UPPER};
use crate::error::{Result, VisionError};
use opencv::core::{self, CV_8UC3, Mat, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

/// Inclusive HSV box, hue on OpenCV's 0..180 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const GREEN: HsvRange = HsvRange {
        lower: GREEN_HSV_LOWER,
        upper: GREEN_HSV_UPPER,
    };

    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Result<Self> {
        if lower.iter().zip(&upper).any(|(lo, hi)| lo > hi) {
            return Err(VisionError::Config(format!(
                "HSV lower bound {:?} exceeds upper bound {:?}",
                lower, upper
            )));
        }
        Ok(HsvRange { lower, upper })
    }

    fn bound(values: [u8; 3]) -> Result<Mat> {
        let [h, s, v] = values.map(f64::from);
        Ok(Mat::new_rows_cols_with_default(
            1,
            1,
            CV_8UC3,
            Scalar::new(h, s, v, 0.0),
        )?)
    }
}

impl Default for HsvRange {
    fn default() -> Self {
        HsvRange::GREEN
    }
}

/// Binary mask (0 or 255 per pixel) of the BGR pixels whose HSV value lies in `range`
pub fn segment(image: &Mat, range: &HsvRange) -> Result<Mat> {
    if image.channels() != 3 || image.empty() {
        return Err(VisionError::InvalidRequest(format!(
            "Segmentation needs a non-empty BGR image, got {} channel(s)",
            image.channels()
        )));
    }

    let mut hsv = Mat::default();
    imgproc::cvt_color_def(image, &mut hsv, imgproc::COLOR_BGR2HSV)?;

    let mut mask = Mat::default();
    core::in_range(
        &hsv,
        &HsvRange::bound(range.lower)?,
        &HsvRange::bound(range.upper)?,
        &mut mask,
    )?;
    Ok(mask)
}

pub fn segment_green(image: &Mat) -> Result<Mat> {
    segment(image, &HsvRange::GREEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{CV_8UC1, Rect};

    fn patches() -> Mat {
        let mut image =
            Mat::new_rows_cols_with_default(60, 90, CV_8UC3, Scalar::all(0.0)).unwrap();
        let fills = [
            // bright green, dark green, red
            (Rect::new(0, 0, 30, 60), Scalar::new(0.0, 255.0, 0.0, 0.0)),
            (Rect::new(30, 0, 30, 60), Scalar::new(0.0, 60.0, 0.0, 0.0)),
            (Rect::new(60, 0, 30, 60), Scalar::new(0.0, 0.0, 255.0, 0.0)),
        ];
        for (rect, colour) in fills {
            imgproc::rectangle(&mut image, rect, colour, imgproc::FILLED, imgproc::LINE_8, 0)
                .unwrap();
        }
        image
    }

    #[test]
    fn test_green_mask_covers_only_bright_green() {
        let mask = segment_green(&patches()).unwrap();

        assert_eq!(mask.typ(), CV_8UC1);
        assert_eq!((mask.cols(), mask.rows()), (90, 60));
        assert_eq!(core::count_non_zero(&mask).unwrap(), 30 * 60);
        assert_eq!(*mask.at_2d::<u8>(30, 10).unwrap(), 255);
        assert_eq!(*mask.at_2d::<u8>(30, 45).unwrap(), 0);
        assert_eq!(*mask.at_2d::<u8>(30, 75).unwrap(), 0);
    }

    #[test]
    fn test_custom_range_selects_red() {
        let red = HsvRange::new([0, 100, 100], [10, 255, 255]).unwrap();
        let mask = segment(&patches(), &red).unwrap();

        assert_eq!(core::count_non_zero(&mask).unwrap(), 30 * 60);
        assert_eq!(*mask.at_2d::<u8>(0, 89).unwrap(), 255);
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(HsvRange::new([90, 0, 0], [30, 255, 255]).is_err());
    }

    #[test]
    fn test_gray_input_rejected() {
        let gray = Mat::new_rows_cols_with_default(10, 10, CV_8UC1, Scalar::all(0.0)).unwrap();
        assert!(matches!(
            segment_green(&gray),
            Err(VisionError::InvalidRequest(_))
        ));
        assert!(segment_green(&Mat::default()).is_err());
    }
}
