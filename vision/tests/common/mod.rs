//! Shared fixtures: a scripted capture backend and synthetic checkerboard images.

#![allow(dead_code)]

use opencv::core::{self, CV_8UC1, CV_8UC3, Mat, Point2f, Rect, Scalar, Size, Vector};
use opencv::imgcodecs;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use vision::engine::CaptureEvent;
use vision::video::{CaptureBackend, VideoFrame};
use vision::{Result, VisionError};

/// Observable state of a [`FakeBackend`]
#[derive(Debug, Default)]
pub struct FakeDevice {
    /// Indices that open successfully
    pub present: Vec<i32>,
    pub opened: Option<i32>,
    pub width: i32,
    pub height: i32,
    pub props: HashMap<i32, f64>,
    /// Properties whose writes the driver refuses
    pub read_only: Vec<i32>,
    pub deliver_frames: bool,
    pub opens: usize,
    pub releases: usize,
    pub reads: u64,
}

/// Backend whose device lives behind a shared handle so tests can inspect it
#[derive(Clone)]
pub struct FakeBackend {
    device: Arc<Mutex<FakeDevice>>,
}

impl FakeBackend {
    pub fn with_devices(present: &[i32]) -> Self {
        FakeBackend {
            device: Arc::new(Mutex::new(FakeDevice {
                present: present.to_vec(),
                deliver_frames: true,
                ..Default::default()
            })),
        }
    }

    pub fn device(&self) -> MutexGuard<'_, FakeDevice> {
        self.device.lock().unwrap()
    }
}

impl CaptureBackend for FakeBackend {
    fn open(&mut self, index: i32, width: i32, height: i32) -> Result<()> {
        let mut device = self.device();
        device.opens += 1;
        if !device.present.contains(&index) {
            return Err(VisionError::Device(format!(
                "VIDEOIO: can't open camera by index {}",
                index
            )));
        }

        device.opened = Some(index);
        if width > 0 && height > 0 {
            device.width = width;
            device.height = height;
        } else {
            device.width = 64;
            device.height = 48;
        }
        Ok(())
    }

    fn is_opened(&self) -> bool {
        self.device().opened.is_some()
    }

    fn release(&mut self) {
        let mut device = self.device();
        if device.opened.take().is_some() {
            device.releases += 1;
        }
    }

    fn get(&self, prop: i32) -> f64 {
        let device = self.device();
        if device.opened.is_none() {
            return 0.0;
        }
        match prop {
            p if p == CAP_PROP_FRAME_WIDTH => f64::from(device.width),
            p if p == CAP_PROP_FRAME_HEIGHT => f64::from(device.height),
            p => device.props.get(&p).copied().unwrap_or(0.0),
        }
    }

    fn set(&mut self, prop: i32, value: f64) -> bool {
        let mut device = self.device();
        if device.opened.is_none() || device.read_only.contains(&prop) {
            return false;
        }
        device.props.insert(prop, value);
        true
    }

    fn read(&mut self) -> Result<Option<VideoFrame>> {
        let mut device = self.device();
        if device.opened.is_none() {
            return Err(VisionError::DeviceNotOpen);
        }
        if !device.deliver_frames {
            return Ok(None);
        }

        device.reads += 1;
        let shade = (device.reads % 256) as f64;
        let mat = Mat::new_rows_cols_with_default(
            device.height,
            device.width,
            CV_8UC3,
            Scalar::all(shade),
        )?;
        Ok(Some(VideoFrame::new(mat)))
    }
}

/// Collects events until `done` returns true or the timeout expires
pub fn collect_until(
    rx: &Receiver<CaptureEvent>,
    timeout: Duration,
    mut done: impl FnMut(&[CaptureEvent]) -> bool,
) -> Vec<CaptureEvent> {
    let deadline = Instant::now() + timeout;
    let mut events = Vec::new();
    while Instant::now() < deadline {
        if let Ok(event) = rx.recv_timeout(Duration::from_millis(10)) {
            events.push(event);
            if done(&events) {
                break;
            }
        }
    }
    events
}

/// Waits for a condition on shared state
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

// --- synthetic checkerboards ------------------------------------------------

pub const SQUARES_X: i32 = 10;
pub const SQUARES_Y: i32 = 7;
const SQUARE_PX: i32 = 30;
const MARGIN_PX: i32 = 30;
const IMAGE_SIZE: Size = Size {
    width: 640,
    height: 480,
};
const FOCAL: f64 = 600.0;
const DISTANCE: f64 = 600.0;

/// Flat board image: `SQUARES_X`×`SQUARES_Y` squares (9×6 inner corners) on a white margin
fn board_texture() -> Mat {
    let width = SQUARES_X * SQUARE_PX + 2 * MARGIN_PX;
    let height = SQUARES_Y * SQUARE_PX + 2 * MARGIN_PX;
    let mut board =
        Mat::new_rows_cols_with_default(height, width, CV_8UC1, Scalar::all(255.0)).unwrap();

    for row in 0..SQUARES_Y {
        for col in 0..SQUARES_X {
            if (row + col) % 2 == 0 {
                imgproc::rectangle(
                    &mut board,
                    Rect::new(
                        MARGIN_PX + col * SQUARE_PX,
                        MARGIN_PX + row * SQUARE_PX,
                        SQUARE_PX,
                        SQUARE_PX,
                    ),
                    Scalar::all(0.0),
                    imgproc::FILLED,
                    imgproc::LINE_8,
                    0,
                )
                .unwrap();
            }
        }
    }
    board
}

/// Projects a board-plane point through a pinhole camera looking at the
/// board centre, after tilting the board by `tilt_x` / `tilt_y` degrees.
fn project(x: f64, y: f64, tilt_x: f64, tilt_y: f64) -> Point2f {
    let (sa, ca) = tilt_x.to_radians().sin_cos();
    let (sb, cb) = tilt_y.to_radians().sin_cos();

    // Rx then Ry
    let (x1, y1, z1) = (x, y * ca, y * sa);
    let (x2, y2, z2) = (x1 * cb + z1 * sb, y1, -x1 * sb + z1 * cb);

    let z = z2 + DISTANCE;
    Point2f::new(
        (FOCAL * x2 / z + f64::from(IMAGE_SIZE.width) / 2.0) as f32,
        (FOCAL * y2 / z + f64::from(IMAGE_SIZE.height) / 2.0) as f32,
    )
}

/// Renders the board as seen with the given tilt
pub fn render_board(tilt_x: f64, tilt_y: f64) -> Mat {
    let board = board_texture();
    let (w, h) = (f64::from(board.cols()), f64::from(board.rows()));

    let src: Vector<Point2f> = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
        .iter()
        .map(|&(u, v)| Point2f::new(u as f32, v as f32))
        .collect();
    let dst: Vector<Point2f> = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
        .iter()
        .map(|&(u, v)| project(u - w / 2.0, v - h / 2.0, tilt_x, tilt_y))
        .collect();

    let transform = imgproc::get_perspective_transform(&src, &dst, core::DECOMP_LU).unwrap();
    let mut view = Mat::default();
    imgproc::warp_perspective(
        &board,
        &mut view,
        &transform,
        IMAGE_SIZE,
        imgproc::INTER_LINEAR,
        core::BORDER_CONSTANT,
        Scalar::all(255.0),
    )
    .unwrap();
    view
}

/// Tilts used for calibration views
pub const VIEW_TILTS: [(f64, f64); 6] = [
    (0.0, 0.0),
    (20.0, 0.0),
    (-20.0, 0.0),
    (0.0, 20.0),
    (0.0, -20.0),
    (15.0, 15.0),
];

/// Image without any pattern
pub fn render_blank(kind: usize) -> Mat {
    let shade = [255.0, 128.0, 0.0][kind % 3];
    let mut image =
        Mat::new_rows_cols_with_default(IMAGE_SIZE.height, IMAGE_SIZE.width, CV_8UC1, Scalar::all(shade))
            .unwrap();
    if kind % 3 == 1 {
        for i in 0..8 {
            imgproc::rectangle(
                &mut image,
                Rect::new(0, i * 60, IMAGE_SIZE.width, 20),
                Scalar::all(20.0),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )
            .unwrap();
        }
    }
    image
}

pub fn write_image(path: &Path, image: &Mat) {
    assert!(imgcodecs::imwrite(path.to_str().unwrap(), image, &Vector::new()).unwrap());
}

/// Writes `boards` tilted board views and `blanks` pattern-free images into `dir`
pub fn write_image_set(dir: &Path, boards: usize, blanks: usize) {
    for (i, &(tx, ty)) in VIEW_TILTS.iter().cycle().take(boards).enumerate() {
        // repeated tilts get a small extra rotation so views stay distinct
        let extra = (i / VIEW_TILTS.len()) as f64 * 5.0;
        write_image(&dir.join(format!("board_{:02}.png", i)), &render_board(tx + extra, ty));
    }
    for i in 0..blanks {
        write_image(&dir.join(format!("blank_{:02}.png", i)), &render_blank(i));
    }
}

/// Projected inner corner positions for a view, row-major
pub fn expected_corners(tilt_x: f64, tilt_y: f64) -> Vec<Point2f> {
    let w = f64::from(SQUARES_X * SQUARE_PX + 2 * MARGIN_PX);
    let h = f64::from(SQUARES_Y * SQUARE_PX + 2 * MARGIN_PX);
    let mut corners = Vec::new();
    for row in 1..SQUARES_Y {
        for col in 1..SQUARES_X {
            let u = f64::from(MARGIN_PX + col * SQUARE_PX);
            let v = f64::from(MARGIN_PX + row * SQUARE_PX);
            corners.push(project(u - w / 2.0, v - h / 2.0, tilt_x, tilt_y));
        }
    }
    corners
}
