//! Edge-based object outlines: blur, Canny, external contours.

use crate::common::constants::processing::{
    BLUR_KERNEL, CANNY_HIGH_THRESHOLD, CANNY_LOW_THRESHOLD, MIN_CONTOUR_AREA,
};
use crate::error::{Result, VisionError};
use opencv::core::{Mat, Point, Rect, Scalar, Size, Vector};
use opencv::imgproc;
use opencv::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourOptions {
    /// Odd Gaussian kernel side
    pub blur_kernel: i32,
    pub canny_low: f64,
    pub canny_high: f64,
    pub min_area: f64,
}

impl Default for ContourOptions {
    fn default() -> Self {
        ContourOptions {
            blur_kernel: BLUR_KERNEL,
            canny_low: CANNY_LOW_THRESHOLD,
            canny_high: CANNY_HIGH_THRESHOLD,
            min_area: MIN_CONTOUR_AREA,
        }
    }
}

impl ContourOptions {
    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel < 1 || self.blur_kernel % 2 == 0 {
            return Err(VisionError::Config(format!(
                "Blur kernel must be a positive odd size, got {}",
                self.blur_kernel
            )));
        }
        if self.canny_low < 0.0 || self.canny_high < self.canny_low {
            return Err(VisionError::Config(format!(
                "Invalid edge thresholds {}..{}",
                self.canny_low, self.canny_high
            )));
        }
        Ok(())
    }
}

/// One outline that passed the area filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedContour {
    pub bounding_box: Rect,
    pub area: f64,
    /// Centre of mass, truncated to whole pixels; `None` for a zero-moment outline
    pub centroid: Option<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourReport {
    /// Kept outlines in detection order
    pub contours: Vec<DetectedContour>,
    /// Index into `contours` of the one enclosing the most area
    pub largest: Option<usize>,
}

impl ContourReport {
    pub fn largest(&self) -> Option<&DetectedContour> {
        self.largest.and_then(|i| self.contours.get(i))
    }
}

/// Finds external outlines in an 8-bit gray, BGR or BGRA image
pub fn detect_contours(image: &Mat, options: &ContourOptions) -> Result<ContourReport> {
    options.validate()?;
    if image.empty() {
        return Err(VisionError::InvalidRequest(
            "Contour detection needs a non-empty image".to_string(),
        ));
    }

    let gray = to_gray(image)?;
    let mut blurred = Mat::default();
    imgproc::gaussian_blur_def(
        &gray,
        &mut blurred,
        Size::new(options.blur_kernel, options.blur_kernel),
        0.0,
    )?;

    let mut edges = Mat::default();
    imgproc::canny_def(&blurred, &mut edges, options.canny_low, options.canny_high)?;

    let mut outlines: Vector<Vector<Point>> = Vector::new();
    imgproc::find_contours_def(
        &edges,
        &mut outlines,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
    )?;

    let mut report = ContourReport::default();
    let mut max_area = 0.0;

    for outline in outlines.iter() {
        let area = imgproc::contour_area_def(&outline)?;
        if area < options.min_area {
            continue;
        }

        let moments = imgproc::moments_def(&outline)?;
        let centroid = (moments.m00 != 0.0).then(|| {
            Point::new(
                (moments.m10 / moments.m00) as i32,
                (moments.m01 / moments.m00) as i32,
            )
        });

        if area > max_area {
            max_area = area;
            report.largest = Some(report.contours.len());
        }
        report.contours.push(DetectedContour {
            bounding_box: imgproc::bounding_rect(&outline)?,
            area,
            centroid,
        });
    }

    Ok(report)
}

/// BGR copy of `image` with every kept outline boxed in green and its centroid dotted
/// in red; the largest is boxed again in blue with a cyan centroid.
pub fn annotate(image: &Mat, report: &ContourReport) -> Result<Mat> {
    let mut output = to_bgr(image)?;

    for contour in &report.contours {
        imgproc::rectangle(
            &mut output,
            contour.bounding_box,
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            2,
            imgproc::LINE_8,
            0,
        )?;
        if let Some(centre) = contour.centroid {
            imgproc::circle(
                &mut output,
                centre,
                4,
                Scalar::new(0.0, 0.0, 255.0, 0.0),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )?;
        }
    }

    if let Some(largest) = report.largest() {
        imgproc::rectangle(
            &mut output,
            largest.bounding_box,
            Scalar::new(255.0, 0.0, 0.0, 0.0),
            3,
            imgproc::LINE_8,
            0,
        )?;
        if let Some(centre) = largest.centroid {
            imgproc::circle(
                &mut output,
                centre,
                8,
                Scalar::new(255.0, 255.0, 0.0, 0.0),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )?;
        }
    }

    Ok(output)
}

fn to_gray(image: &Mat) -> Result<Mat> {
    match image.channels() {
        1 => Ok(image.try_clone()?),
        3 => cvt(image, imgproc::COLOR_BGR2GRAY),
        4 => cvt(image, imgproc::COLOR_BGRA2GRAY),
        n => Err(unsupported(n)),
    }
}

fn to_bgr(image: &Mat) -> Result<Mat> {
    match image.channels() {
        1 => cvt(image, imgproc::COLOR_GRAY2BGR),
        3 => Ok(image.try_clone()?),
        4 => cvt(image, imgproc::COLOR_BGRA2BGR),
        n => Err(unsupported(n)),
    }
}

fn cvt(image: &Mat, code: i32) -> Result<Mat> {
    let mut converted = Mat::default();
    imgproc::cvt_color_def(image, &mut converted, code)?;
    Ok(converted)
}

fn unsupported(channels: i32) -> VisionError {
    VisionError::InvalidRequest(format!("Unsupported image with {} channels", channels))
}
