//! Lens distortion correction for captured frames.

use crate::calibration::intrinsics::CameraIntrinsics;
use crate::error::Result;
use opencv::calib3d;
use opencv::core::{BORDER_CONSTANT, CV_16SC2, Mat, Scalar, Size};
use opencv::imgproc;
use opencv::prelude::*;

use super::frame::VideoFrame;

/// Precomputed remap tables for one frame size
struct RemapTables {
    size: Size,
    map1: Mat,
    map2: Mat,
}

/// Per-frame corrector owned by the capture loop
///
/// Without intrinsics every frame is returned as an independent copy. With
/// intrinsics the undistortion maps are built for the first frame size seen
/// and rebuilt only when the size changes.
pub struct FrameCorrector {
    intrinsics: Option<CorrectionMats>,
    tables: Option<RemapTables>,
}

struct CorrectionMats {
    camera: Mat,
    distortion: Mat,
    optimal: Mat,
}

impl FrameCorrector {
    pub fn new(intrinsics: Option<&CameraIntrinsics>) -> Result<Self> {
        let intrinsics = match intrinsics {
            Some(i) => Some(CorrectionMats {
                camera: i.camera_matrix_mat()?,
                distortion: i.distortion_mat()?,
                optimal: i.optimal_matrix_mat()?,
            }),
            None => None,
        };

        Ok(FrameCorrector {
            intrinsics,
            tables: None,
        })
    }

    /// Corrector that only copies frames
    pub fn passthrough() -> Self {
        FrameCorrector {
            intrinsics: None,
            tables: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.intrinsics.is_some()
    }

    pub fn correct(&mut self, frame: &VideoFrame) -> Result<VideoFrame> {
        let Some(mats) = self.intrinsics.as_ref() else {
            return frame.deep_copy();
        };

        let size = Size::new(frame.width(), frame.height());
        if self.tables.as_ref().is_none_or(|t| t.size != size) {
            self.tables = Some(build_tables(mats, size)?);
        }

        let mut corrected = Mat::default();
        if let Some(tables) = self.tables.as_ref() {
            imgproc::remap(
                frame.data(),
                &mut corrected,
                &tables.map1,
                &tables.map2,
                imgproc::INTER_LINEAR,
                BORDER_CONSTANT,
                Scalar::default(),
            )?;
        }
        Ok(frame.derive(corrected))
    }
}

fn build_tables(mats: &CorrectionMats, size: Size) -> Result<RemapTables> {
    let new_camera = if mats.optimal.empty() {
        &mats.camera
    } else {
        &mats.optimal
    };

    let mut map1 = Mat::default();
    let mut map2 = Mat::default();
    calib3d::init_undistort_rectify_map(
        &mats.camera,
        &mats.distortion,
        &Mat::default(),
        new_camera,
        size,
        CV_16SC2,
        &mut map1,
        &mut map2,
    )?;

    Ok(RemapTables { size, map1, map2 })
}

/// Stateless form: undistorts `frame` with `intrinsics`, or copies it when absent
pub fn correct(frame: &VideoFrame, intrinsics: Option<&CameraIntrinsics>) -> Result<VideoFrame> {
    let Some(intrinsics) = intrinsics else {
        return frame.deep_copy();
    };

    let mut corrected = Mat::default();
    calib3d::undistort(
        frame.data(),
        &mut corrected,
        &intrinsics.camera_matrix_mat()?,
        &intrinsics.distortion_mat()?,
        &intrinsics.optimal_matrix_mat()?,
    )?;
    Ok(frame.derive(corrected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::frame::PixelLayout;
    use opencv::core::{CV_8UC3, Rect};

    fn test_frame() -> VideoFrame {
        let mut mat =
            Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(40.0)).unwrap();
        imgproc::rectangle(
            &mut mat,
            Rect::new(40, 30, 80, 60),
            Scalar::new(200.0, 100.0, 50.0, 0.0),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
        VideoFrame::new(mat).with_sequence(11)
    }

    fn intrinsics(k1: f64) -> CameraIntrinsics {
        CameraIntrinsics::new(
            [[150.0, 0.0, 80.0], [0.0, 150.0, 60.0], [0.0, 0.0, 1.0]],
            vec![k1, 0.0, 0.0, 0.0, 0.0],
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_passthrough_is_identical_and_distinct() {
        let frame = test_frame();
        let mut corrector = FrameCorrector::new(None).unwrap();

        let mut out = corrector.correct(&frame).unwrap();
        assert_eq!(out.data().data_bytes().unwrap(), frame.data().data_bytes().unwrap());
        assert_eq!(out.sequence(), 11);

        out.data_mut().data_bytes_mut().unwrap().fill(0);
        assert_eq!(frame.data().data_bytes().unwrap()[0], 40);
    }

    #[test]
    fn test_free_function_passthrough() {
        let frame = test_frame();
        let out = correct(&frame, None).unwrap();
        assert_eq!(out.data().data_bytes().unwrap(), frame.data().data_bytes().unwrap());
        assert_ne!(
            out.data().data_bytes().unwrap().as_ptr(),
            frame.data().data_bytes().unwrap().as_ptr()
        );
    }

    #[test]
    fn test_zero_distortion_keeps_geometry() {
        let frame = test_frame();
        let mut corrector = FrameCorrector::new(Some(&intrinsics(0.0))).unwrap();

        let out = corrector.correct(&frame).unwrap();
        assert_eq!(out.width(), 160);
        assert_eq!(out.height(), 120);
        assert_eq!(out.layout(), PixelLayout::Bgr8);

        let centre = out.data().at_2d::<opencv::core::Vec3b>(60, 80).unwrap();
        assert_eq!(centre[0], 200);
    }

    #[test]
    fn test_distortion_changes_pixels() {
        let frame = test_frame();
        let mut corrector = FrameCorrector::new(Some(&intrinsics(-0.5))).unwrap();
        assert!(corrector.is_active());

        let out = corrector.correct(&frame).unwrap();
        assert_ne!(out.data().data_bytes().unwrap(), frame.data().data_bytes().unwrap());

        let stateless = correct(&frame, Some(&intrinsics(-0.5))).unwrap();
        assert_eq!(stateless.width(), 160);
    }

    #[test]
    fn test_tables_rebuilt_on_size_change() {
        let mut corrector = FrameCorrector::new(Some(&intrinsics(0.0))).unwrap();
        corrector.correct(&test_frame()).unwrap();

        let small = Mat::new_rows_cols_with_default(60, 80, CV_8UC3, Scalar::all(1.0)).unwrap();
        let out = corrector.correct(&VideoFrame::new(small)).unwrap();
        assert_eq!((out.width(), out.height()), (80, 60));
    }
}
